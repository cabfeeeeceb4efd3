use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    catalog::{CourseCategory, average_rating, contains_pattern, first_price, is_valid_rating},
    config::AppConfig,
    dto::courses::{
        AddReviewRequest, CategoryMap, ChapterLessons, CourseDetail, CourseList, CourseQuery,
        CreateChapterRequest, CreateCourseRequest, CreateLessonRequest, UpdateCourseRequest,
    },
    entity::{
        course_chapters::{ActiveModel as ChapterActive, Column as ChapterCol, Entity as Chapters},
        course_lessons::{ActiveModel as LessonActive, Column as LessonCol, Entity as Lessons},
        course_ratings::{ActiveModel as RatingActive, Column as RatingCol, Entity as Ratings},
        course_reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        courses::{ActiveModel as CourseActive, Column as CourseCol, Entity as Courses, Model as CourseModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_author_or_staff},
    models::{Chapter, ChapterSummary, Course, CourseCard, Lesson, Review},
    response::{ApiResponse, Meta},
    state::AppState,
    uploads::{discard_upload, save_upload},
};

pub fn course_card_from_entity(config: &AppConfig, model: &CourseModel) -> CourseCard {
    CourseCard {
        id: model.id,
        title: model.title.clone(),
        price: model.price,
        image_url: config.media_url(&model.image),
    }
}

fn course_from_entity(
    config: &AppConfig,
    model: CourseModel,
    author: String,
    ratings: &[i32],
) -> Course {
    let category_display = model
        .category
        .parse::<CourseCategory>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| model.category.clone());
    Course {
        id: model.id,
        first_price: first_price(model.price),
        price: model.price,
        category: model.category,
        category_display,
        image: config.media_url(&model.image),
        author,
        average_rating: average_rating(ratings),
        count_ratings: ratings.len() as i64,
        title: model.title,
        description: model.description,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Fetches author names and ratings for a batch of courses in two queries.
async fn courses_with_details<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    models: Vec<CourseModel>,
) -> AppResult<Vec<Course>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let course_ids: Vec<i64> = models.iter().map(|c| c.id).collect();
    let author_ids: Vec<i64> = models.iter().map(|c| c.author_id).collect();

    let authors: HashMap<i64, String> = Users::find()
        .filter(UserCol::Id.is_in(author_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name()))
        .collect();

    let mut ratings: HashMap<i64, Vec<i32>> = HashMap::new();
    for row in Ratings::find()
        .filter(RatingCol::CourseId.is_in(course_ids))
        .all(db)
        .await?
    {
        ratings.entry(row.course_id).or_default().push(row.rating);
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned().unwrap_or_default();
            let course_ratings = ratings.get(&model.id).map(Vec::as_slice).unwrap_or(&[]);
            course_from_entity(config, model, author, course_ratings)
        })
        .collect())
}

pub(crate) async fn find_course<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<CourseModel> {
    Courses::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))
}

pub fn list_categories() -> ApiResponse<CategoryMap> {
    let items = CourseCategory::ALL
        .iter()
        .map(|c| (c.key().to_string(), c.label().to_string()))
        .collect();
    ApiResponse::success("Categories", CategoryMap { items }, Some(Meta::empty()))
}

pub async fn list_courses(state: &AppState, query: CourseQuery) -> AppResult<ApiResponse<CourseList>> {
    let mut condition = Condition::all();
    if let Some(category) = query.category.as_ref().filter(|c| !c.trim().is_empty()) {
        // Unknown categories fall through unchanged and match nothing.
        let key = category
            .parse::<CourseCategory>()
            .map(|c| c.key().to_string())
            .unwrap_or_else(|_| category.trim().to_string());
        condition = condition.add(CourseCol::Category.eq(key));
    }
    if let Some(title) = query.title.as_ref().filter(|t| !t.trim().is_empty()) {
        let pattern = contains_pattern(title.trim());
        condition = condition.add(Expr::col(CourseCol::Title).ilike(pattern));
    }

    let models = Courses::find()
        .filter(condition)
        .order_by_asc(CourseCol::Id)
        .all(&state.orm)
        .await?;
    let items = courses_with_details(&state.orm, &state.config, models).await?;
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success("Courses", CourseList { items }, Some(meta)))
}

pub async fn get_course_detail(state: &AppState, id: i64) -> AppResult<ApiResponse<CourseDetail>> {
    let model = find_course(&state.orm, id).await?;

    let chapter_models = Chapters::find()
        .filter(ChapterCol::CourseId.eq(model.id))
        .order_by_asc(ChapterCol::Id)
        .all(&state.orm)
        .await?;
    let chapter_ids: Vec<i64> = chapter_models.iter().map(|c| c.id).collect();
    let mut lesson_counts: HashMap<i64, i64> = HashMap::new();
    if !chapter_ids.is_empty() {
        for lesson in Lessons::find()
            .filter(LessonCol::ChapterId.is_in(chapter_ids))
            .all(&state.orm)
            .await?
        {
            *lesson_counts.entry(lesson.chapter_id).or_default() += 1;
        }
    }
    let chapters = chapter_models
        .into_iter()
        .map(|c| ChapterSummary {
            count_lessons: lesson_counts.get(&c.id).copied().unwrap_or(0),
            id: c.id,
            title: c.title,
            description: c.description,
        })
        .collect();

    let review_rows = Reviews::find()
        .filter(ReviewCol::CourseId.eq(model.id))
        .find_also_related(Users)
        .order_by_asc(ReviewCol::Id)
        .all(&state.orm)
        .await?;
    let reviews = review_rows
        .into_iter()
        .map(|(review, reviewer)| Review {
            id: review.id,
            user: reviewer.map(|u| u.full_name()).unwrap_or_default(),
            text: review.text,
            created_at: review.created_at.with_timezone(&Utc),
        })
        .collect();

    let course = courses_with_details(&state.orm, &state.config, vec![model])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Course"))?;

    Ok(ApiResponse::success(
        "Course",
        CourseDetail {
            course,
            chapters,
            reviews,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_chapter_lessons(state: &AppState, id: i64) -> AppResult<ApiResponse<ChapterLessons>> {
    let chapter = Chapters::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Chapter"))?;

    let lessons = chapter
        .find_related(Lessons)
        .order_by_asc(LessonCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|l| Lesson {
            id: l.id,
            title: l.title,
            description: l.description,
            video_url: l.video_url,
        })
        .collect();

    Ok(ApiResponse::success(
        "Lessons",
        ChapterLessons {
            id: chapter.id,
            lessons,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_course(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    let image = save_upload(&state.config.media_root, "courses", &payload.image).await?;

    let inserted = CourseActive {
        id: NotSet,
        title: Set(payload.title),
        description: Set(payload.description),
        price: Set(payload.price),
        category: Set(payload.category.key().to_string()),
        image: Set(image.clone()),
        author_id: Set(user.user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;
    let model = match inserted {
        Ok(model) => model,
        Err(err) => {
            discard_upload(&state.config.media_root, &image).await;
            return Err(err.into());
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "course_create",
        "courses",
        serde_json::json!({ "course_id": model.id }),
    )
    .await;

    let course = courses_with_details(&state.orm, &state.config, vec![model])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Course"))?;
    Ok(ApiResponse::success("Course created", course, Some(Meta::empty())))
}

pub async fn create_chapter(
    state: &AppState,
    user: &AuthUser,
    payload: CreateChapterRequest,
) -> AppResult<ApiResponse<Chapter>> {
    payload.validate()?;
    let course = find_course(&state.orm, payload.course).await?;
    ensure_author_or_staff(user, course.author_id)?;

    let chapter = ChapterActive {
        id: NotSet,
        course_id: Set(course.id),
        title: Set(payload.title),
        description: Set(payload.description),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "chapter_create",
        "course_chapters",
        serde_json::json!({ "course_id": course.id, "chapter_id": chapter.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Chapter created",
        Chapter {
            id: chapter.id,
            course_id: chapter.course_id,
            title: chapter.title,
            description: chapter.description,
            created_at: chapter.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_lesson(
    state: &AppState,
    user: &AuthUser,
    payload: CreateLessonRequest,
) -> AppResult<ApiResponse<Lesson>> {
    payload.validate()?;
    let (chapter, course) = Chapters::find_by_id(payload.chapter)
        .find_also_related(Courses)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Chapter"))?;
    let course = course.ok_or_else(|| AppError::not_found("Course"))?;
    ensure_author_or_staff(user, course.author_id)?;

    let lesson = LessonActive {
        id: NotSet,
        chapter_id: Set(chapter.id),
        title: Set(payload.title),
        description: Set(payload.description),
        video_url: Set(payload.video_url),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "lesson_create",
        "course_lessons",
        serde_json::json!({ "chapter_id": chapter.id, "lesson_id": lesson.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Lesson created",
        Lesson {
            id: lesson.id,
            title: lesson.title,
            description: lesson.description,
            video_url: lesson.video_url,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_course(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    payload: UpdateCourseRequest,
) -> AppResult<ApiResponse<Course>> {
    let existing = find_course(&state.orm, id).await?;
    ensure_author_or_staff(user, existing.author_id)?;

    let mut active: CourseActive = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(category.key().to_string());
    }
    let mut new_upload = None;
    if let Some(file) = payload.image.as_ref() {
        let image = save_upload(&state.config.media_root, "courses", file).await?;
        active.image = Set(image.clone());
        new_upload = Some(image);
    }
    active.updated_at = Set(Utc::now().into());
    let model = match active.update(&state.orm).await {
        Ok(model) => model,
        Err(err) => {
            if let Some(image) = new_upload {
                discard_upload(&state.config.media_root, &image).await;
            }
            return Err(err.into());
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "course_update",
        "courses",
        serde_json::json!({ "course_id": model.id }),
    )
    .await;

    let course = courses_with_details(&state.orm, &state.config, vec![model])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Course"))?;
    Ok(ApiResponse::success("Course updated", course, Some(Meta::empty())))
}

/// Dependent rows (chapters, lessons, reviews, ratings, cart entries, likes) go with it
/// through `ON DELETE CASCADE`.
pub async fn delete_course(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = find_course(&state.orm, id).await?;
    ensure_author_or_staff(user, existing.author_id)?;

    Courses::delete_by_id(existing.id).exec(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "course_delete",
        "courses",
        serde_json::json!({ "course_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Course deleted"))
}

pub async fn add_review_and_rating(
    state: &AppState,
    user: &AuthUser,
    payload: AddReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;
    if !is_valid_rating(payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }
    let course = find_course(&state.orm, payload.course).await?;

    let txn = state.orm.begin().await?;
    let review = ReviewActive {
        id: NotSet,
        course_id: Set(course.id),
        user_id: Set(user.user_id),
        text: Set(payload.text),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    RatingActive {
        id: NotSet,
        course_id: Set(course.id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    let reviewer = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .map(|u| u.full_name())
        .unwrap_or_default();

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "course_reviews",
        serde_json::json!({ "course_id": course.id, "rating": payload.rating }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review added",
        Review {
            id: review.id,
            user: reviewer,
            text: review.text,
            created_at: review.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}
