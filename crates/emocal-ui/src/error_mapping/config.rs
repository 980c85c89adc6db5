use emocal_core::ConfigError;
use emocal_weather::ParseCategoryError;

pub fn map_category_error(e: ParseCategoryError) -> ConfigError {
    ConfigError::UnknownCategory(e.0)
}
