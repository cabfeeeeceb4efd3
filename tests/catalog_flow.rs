mod common;

use std::sync::Arc;

use course_marketplace_api::{
    dto::{
        cart::CourseIdRequest,
        courses::{AddReviewRequest, CourseQuery, CreateChapterRequest, CreateLessonRequest},
    },
    error::AppError,
    services::{cart_service, course_service, favorite_service},
};
use rust_decimal::Decimal;

use common::{RecordingMailer, create_course, create_user, database_url, setup_state};

// Integration flow: browse -> author content -> reviews -> favorites -> delete.
#[tokio::test]
async fn browse_author_review_and_favorite_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&database_url, Arc::new(RecordingMailer::default())).await?;

    let author = create_user(&state, "author@example.com", "+77000000020", false).await?;
    let stranger = create_user(&state, "stranger@example.com", "+77000000021", false).await?;
    let staff = create_user(&state, "staff@example.com", "+77000000022", true).await?;

    let photoshop =
        create_course(&state, &author, "Photoshop retouching", 1000, "adobe photoshop").await?;
    let web = create_course(&state, &author, "Web APIs with Rust", 2000, "web development").await?;

    let all = course_service::list_courses(
        &state,
        CourseQuery {
            category: None,
            title: None,
        },
    )
    .await?
    .data
    .expect("courses")
    .items;
    assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![photoshop, web]);
    assert_eq!(all[0].first_price, Decimal::from(1100));
    assert_eq!(all[0].category_display, "Adobe Photoshop");
    assert_eq!(all[0].author, "Test User");
    assert_eq!(all[0].average_rating, 0.0);

    let by_category = course_service::list_courses(
        &state,
        CourseQuery {
            category: Some("web development".into()),
            title: None,
        },
    )
    .await?
    .data
    .expect("courses")
    .items;
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, web);

    let by_title = course_service::list_courses(
        &state,
        CourseQuery {
            category: None,
            title: Some("RETOUCH".into()),
        },
    )
    .await?
    .data
    .expect("courses")
    .items;
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id, photoshop);

    // Wildcards in the search text are literal; category keys match in any case.
    let percent = create_course(&state, &author, "100% Godot", 1500, "Game development").await?;
    let search = |category: Option<&str>, title: Option<&str>| CourseQuery {
        category: category.map(str::to_string),
        title: title.map(str::to_string),
    };
    for title in ["100%", "%"] {
        let found = course_service::list_courses(&state, search(None, Some(title)))
            .await?
            .data
            .expect("courses")
            .items;
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![percent]);
    }
    let underscore = course_service::list_courses(&state, search(None, Some("_")))
        .await?
        .data
        .expect("courses")
        .items;
    assert!(underscore.is_empty());
    for category in ["Game development", "game DEVELOPMENT"] {
        let found = course_service::list_courses(&state, search(Some(category), None))
            .await?
            .data
            .expect("courses")
            .items;
        assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![percent]);
        assert_eq!(found[0].category_display, "Game Development");
    }
    let unknown = course_service::list_courses(&state, search(Some("cooking"), None))
        .await?
        .data
        .expect("courses")
        .items;
    assert!(unknown.is_empty());

    // Only the author (or staff) adds chapters and lessons.
    let chapter_request = |course| CreateChapterRequest {
        course,
        title: "Getting started".into(),
        description: "Tools and setup".into(),
    };
    let err = course_service::create_chapter(&state, &stranger, chapter_request(photoshop))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = course_service::create_chapter(&state, &author, chapter_request(999_999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let chapter = course_service::create_chapter(&state, &author, chapter_request(photoshop))
        .await?
        .data
        .expect("chapter");
    course_service::create_chapter(&state, &staff, chapter_request(photoshop)).await?;

    let lesson_request = || CreateLessonRequest {
        chapter: chapter.id,
        title: "Layers".into(),
        description: "Working with layers".into(),
        video_url: "https://videos.example.com/layers".into(),
    };
    let err = course_service::create_lesson(&state, &stranger, lesson_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    course_service::create_lesson(&state, &author, lesson_request()).await?;
    course_service::create_lesson(&state, &author, lesson_request()).await?;

    let lessons = course_service::get_chapter_lessons(&state, chapter.id)
        .await?
        .data
        .expect("lessons");
    assert_eq!(lessons.id, chapter.id);
    assert_eq!(lessons.lessons.len(), 2);
    let err = course_service::get_chapter_lessons(&state, 999_999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Reviews and ratings
    let err = course_service::add_review_and_rating(
        &state,
        &stranger,
        AddReviewRequest {
            course: photoshop,
            text: "Too good".into(),
            rating: 6,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    for (user, rating) in [(&stranger, 3), (&staff, 4), (&author, 5)] {
        course_service::add_review_and_rating(
            &state,
            user,
            AddReviewRequest {
                course: photoshop,
                text: format!("Worth {rating} stars"),
                rating,
            },
        )
        .await?;
    }

    let detail = course_service::get_course_detail(&state, photoshop)
        .await?
        .data
        .expect("detail");
    assert_eq!(detail.course.average_rating, 4.0);
    assert_eq!(detail.course.count_ratings, 3);
    assert_eq!(detail.reviews.len(), 3);
    assert_eq!(detail.reviews[0].user, "Test User");
    assert_eq!(detail.chapters.len(), 2);
    assert_eq!(detail.chapters[0].count_lessons, 2);
    assert_eq!(detail.chapters[1].count_lessons, 0);
    let err = course_service::get_course_detail(&state, 999_999)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Favorites
    favorite_service::add_favorite(&state, &stranger, CourseIdRequest { course_id: photoshop })
        .await?;
    let err =
        favorite_service::add_favorite(&state, &stranger, CourseIdRequest { course_id: photoshop })
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    favorite_service::add_favorite(&state, &stranger, CourseIdRequest { course_id: web }).await?;
    let favorites = favorite_service::list_favorites(&state, &stranger)
        .await?
        .data
        .expect("favorites")
        .items;
    assert_eq!(favorites.len(), 2);

    favorite_service::remove_favorite(&state, &stranger, CourseIdRequest { course_id: web })
        .await?;
    let err =
        favorite_service::remove_favorite(&state, &stranger, CourseIdRequest { course_id: 999_999 })
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let favorites = favorite_service::list_favorites(&state, &stranger)
        .await?
        .data
        .expect("favorites")
        .items;
    assert_eq!(favorites.iter().map(|c| c.id).collect::<Vec<_>>(), vec![photoshop]);

    // Deleting a course takes its cart entries and likes with it.
    cart_service::add_to_cart(&state, &stranger, CourseIdRequest { course_id: photoshop }).await?;
    let err = course_service::delete_course(&state, &stranger, photoshop)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    course_service::delete_course(&state, &author, photoshop).await?;

    let cart = cart_service::get_cart(&state, &stranger).await?;
    assert!(cart.data.expect("cart").courses.is_empty());
    let favorites = favorite_service::list_favorites(&state, &stranger).await?;
    assert!(favorites.data.expect("favorites").items.is_empty());
    let err = course_service::get_course_detail(&state, photoshop)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}
