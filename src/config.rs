/// 配置管理模組
///
/// 本模組負責定義和驗證客戶端配置。
// 宣告子模組
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use types::RedisConfig;
pub use validation::{validate_config, ValidationError, ValidationUtils, Validator};
