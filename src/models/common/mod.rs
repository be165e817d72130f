pub mod de;
pub mod error_code;
pub mod labels;
pub mod pagination;
pub mod response;

pub use error_code::ErrorCode;
pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::ApiResponse;
