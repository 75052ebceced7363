//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, carts, circulation, health, locations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfwise API",
        version = "0.3.0",
        description = "Library inventory, borrow and return REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Locations
        locations::list_areas,
        locations::get_area,
        locations::create_area,
        locations::update_area,
        locations::delete_area,
        locations::list_bookshelves,
        locations::get_bookshelf,
        locations::create_bookshelf,
        locations::update_bookshelf,
        locations::delete_bookshelf,
        locations::list_shelf_layers,
        locations::get_shelf_layer,
        locations::create_shelf_layer,
        locations::update_shelf_layer,
        locations::delete_shelf_layer,
        locations::location_tree,
        // Books
        books::list_books,
        books::get_book,
        books::get_book_by_barcode,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Staging carts
        carts::set_borrow_user,
        carts::get_borrow_cart,
        carts::add_borrow_item,
        carts::remove_borrow_item,
        carts::complete_borrow,
        carts::set_return_user,
        carts::get_return_cart,
        carts::add_return_item,
        carts::remove_return_item,
        carts::complete_return,
        // Circulation
        circulation::borrow_direct,
        circulation::return_direct,
        circulation::scan,
        circulation::list_records,
        circulation::borrower_loans,
    ),
    components(
        schemas(
            // Locations
            crate::models::location::Area,
            crate::models::location::AreaInput,
            crate::models::location::Bookshelf,
            crate::models::location::BookshelfInput,
            crate::models::location::ShelfLayer,
            crate::models::location::ShelfLayerInput,
            crate::models::location::AreaNode,
            crate::models::location::BookshelfNode,
            crate::models::location::ShelfLayerNode,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::StockFilter,
            crate::api::PaginatedBooks,
            // Carts
            crate::models::cart::CartSlot,
            crate::models::cart::CartUser,
            crate::models::cart::CartItem,
            crate::models::cart::Cart,
            crate::models::cart::AddCartItem,
            // Circulation
            crate::models::borrow::BorrowStatus,
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowedBook,
            crate::models::borrow::BorrowRecordDetails,
            crate::models::borrow::BorrowLine,
            crate::models::borrow::BorrowReceipt,
            crate::models::borrow::DirectBorrow,
            crate::models::borrow::DirectReturn,
            crate::models::borrow::ReturnStatus,
            crate::models::borrow::ReturnLine,
            crate::models::borrow::ScanRequest,
            crate::models::borrow::ScanResult,
            crate::models::borrower::BorrowerLoans,
            crate::api::PaginatedBorrowRecords,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "locations", description = "Areas, bookshelves and shelf layers"),
        (name = "books", description = "Book catalog"),
        (name = "borrow-cart", description = "Staged borrow at the desk"),
        (name = "return-cart", description = "Staged return at the desk"),
        (name = "circulation", description = "Direct borrow/return and borrow history")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
