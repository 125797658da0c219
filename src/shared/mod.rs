pub mod constants;
pub mod file_types;
pub mod templates;
#[cfg(test)]
pub mod test_helpers;
pub mod text;
pub mod types;
pub mod validation;
