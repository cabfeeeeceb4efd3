use course_marketplace_api::{
    catalog::CourseCategory,
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;

struct SeedUser<'a> {
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    phone: &'a str,
    iin: &'a str,
    is_staff: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&config.database_url).await?;

    let author_id = ensure_user(
        &pool,
        SeedUser {
            email: "author@example.com",
            password: "author12345",
            first_name: "Aigerim",
            last_name: "Sadykova",
            phone: "+77010000001",
            iin: "900101300001",
            is_staff: true,
        },
    )
    .await?;
    let user_id = ensure_user(
        &pool,
        SeedUser {
            email: "student@example.com",
            password: "student12345",
            first_name: "Nurlan",
            last_name: "Abenov",
            phone: "+77010000002",
            iin: "010203400002",
            is_staff: false,
        },
    )
    .await?;
    seed_courses(&pool, author_id).await?;

    println!("Seed completed. Author ID: {author_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, user: SeedUser<'_>) -> anyhow::Result<i64> {
    let password_hash = hash_password(user.password)?;

    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (email, first_name, last_name, phone, iin, password_hash, is_staff, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        ON CONFLICT (email) DO UPDATE SET is_staff = EXCLUDED.is_staff, is_active = TRUE
        RETURNING id
        "#,
    )
    .bind(user.email)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.phone)
    .bind(user.iin)
    .bind(password_hash)
    .bind(user.is_staff)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {} (staff={})", user.email, user.is_staff);
    Ok(row.0)
}

async fn seed_courses(pool: &sqlx::PgPool, author_id: i64) -> anyhow::Result<()> {
    let courses = vec![
        (
            "Photoshop from scratch",
            "Layers, masks and retouching for beginners",
            Decimal::new(1500000, 2),
            CourseCategory::AdobePhotoshop,
        ),
        (
            "Modern web development",
            "HTML, CSS and a typed backend",
            Decimal::new(2500000, 2),
            CourseCategory::WebDevelopment,
        ),
        (
            "Data science essentials",
            "Statistics, notebooks and model evaluation",
            Decimal::new(3000000, 2),
            CourseCategory::DataScience,
        ),
    ];

    for (title, description, price, category) in courses {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM courses WHERE title = $1")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let course: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO courses (title, description, price, category, image, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(category.key())
        .bind("uploads/courses/placeholder.png")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

        for chapter_no in 1..=2 {
            let chapter: (i64,) = sqlx::query_as(
                r#"
                INSERT INTO course_chapters (course_id, title, description)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(course.0)
            .bind(format!("Chapter {chapter_no}"))
            .bind(format!("Part {chapter_no} of {title}"))
            .fetch_one(pool)
            .await?;

            for lesson_no in 1..=3 {
                sqlx::query(
                    r#"
                    INSERT INTO course_lessons (chapter_id, title, description, video_url)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(chapter.0)
                .bind(format!("Lesson {chapter_no}.{lesson_no}"))
                .bind("Video lesson")
                .bind(format!(
                    "https://videos.example.com/{}/{chapter_no}/{lesson_no}",
                    course.0
                ))
                .execute(pool)
                .await?;
            }
        }
    }

    println!("Seeded courses");
    Ok(())
}
