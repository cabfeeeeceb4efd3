use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    catalog::CourseCategory,
    dto::{
        auth::{
            AccessToken, CodeRequest, EmailRequest, LoginRequest, RefreshRequest,
            RegisterMultipart, ResetPasswordRequest, TokenPair, UpdateProfileMultipart, UserList,
        },
        cart::{CartView, CourseIdRequest},
        courses::{
            AddReviewRequest, CategoryMap, ChapterLessons, CourseDetail, CourseList,
            CreateChapterRequest, CreateCourseMultipart, CreateLessonRequest,
            UpdateCourseMultipart,
        },
        favorites::FavoriteCourseList,
        orders::{CheckoutRequest, CityList, PurchaseList, TotalCost},
    },
    models::{
        Certificate, Chapter, ChapterSummary, City, Course, CourseCard, Lesson, Purchase, Review,
        Shipping, UserProfile,
    },
    response::{ApiResponse, Meta},
    routes::{auth, cart, courses, favorites, health, orders, params},
    shipping::ShippingCity,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::sign_up,
        auth::verify_email,
        auth::login,
        auth::refresh_token,
        auth::logout,
        auth::send_reset_password_code,
        auth::check_reset_password_code,
        auth::reset_password,
        auth::get_user_list,
        auth::get_profile_info,
        auth::update_profile_info,
        courses::get_category_list,
        courses::get_course_list,
        courses::get_course_detail,
        courses::get_chapter_lessons,
        courses::add_course,
        courses::add_course_chapter,
        courses::add_chapter_lesson,
        courses::edit_course,
        courses::delete_course,
        courses::add_review_and_rating,
        cart::get_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        favorites::get_favorite,
        favorites::add_to_favorite,
        favorites::remove_from_favorite,
        orders::get_cities,
        orders::get_total_cost,
        orders::checkout,
        orders::get_orders
    ),
    components(
        schemas(
            UserProfile,
            Course,
            CourseCard,
            CourseCategory,
            ChapterSummary,
            Chapter,
            Lesson,
            Review,
            Certificate,
            Shipping,
            Purchase,
            City,
            ShippingCity,
            RegisterMultipart,
            UpdateProfileMultipart,
            LoginRequest,
            TokenPair,
            RefreshRequest,
            AccessToken,
            EmailRequest,
            CodeRequest,
            ResetPasswordRequest,
            UserList,
            CreateCourseMultipart,
            UpdateCourseMultipart,
            CreateChapterRequest,
            CreateLessonRequest,
            AddReviewRequest,
            CourseList,
            CourseDetail,
            ChapterLessons,
            CategoryMap,
            CourseIdRequest,
            CartView,
            FavoriteCourseList,
            CheckoutRequest,
            TotalCost,
            PurchaseList,
            CityList,
            params::Pagination,
            Meta,
            ApiResponse<UserProfile>,
            ApiResponse<TokenPair>,
            ApiResponse<CourseList>,
            ApiResponse<CourseDetail>,
            ApiResponse<CartView>,
            ApiResponse<Purchase>,
            ApiResponse<PurchaseList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password reset"),
        (name = "Users", description = "User list and profile"),
        (name = "Courses", description = "Catalog, authoring and reviews"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Orders", description = "Shipping, checkout and purchase history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
