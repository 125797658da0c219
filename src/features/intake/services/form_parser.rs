//! Reads `multipart/form-data` intake submissions.

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use serde_json::{Map, Value};

use crate::core::config::IntakeConfig;
use crate::core::error::{AppError, Result};
use crate::features::intake::dtos::IntakeSubmissionDto;
use crate::shared::file_types::{is_allowed, resolve_content_type, INTAKE_CONTENT_TYPES};
use crate::shared::text::truncate_chars;

const MAX_DISPLAY_NAME_CHARS: usize = 200;

/// File part held in memory until it is uploaded and emailed
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the browser, directory components removed
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

fn is_file_field(name: &str) -> bool {
    matches!(name, "files" | "files[]" | "file")
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

fn display_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() {
        return "file".to_string();
    }
    truncate_chars(base, MAX_DISPLAY_NAME_CHARS)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("送信データが大きすぎます".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", err))
    }
}

fn megabytes(bytes: usize) -> usize {
    bytes / 1024 / 1024
}

/// Read one file part, stopping as soon as it exceeds `max_size`
async fn read_file_part(field: &mut Field<'_>, name: &str, max_size: usize) -> Result<Bytes> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > max_size {
            return Err(AppError::BadRequest(format!(
                "ファイル「{}」のサイズが上限（{}MB）を超えています",
                name,
                megabytes(max_size)
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Split a multipart submission into form fields and files.
///
/// Text parts are collected into a JSON object and deserialized like a JSON
/// body; `consent` accepts checkbox values such as `on`. Empty file parts
/// are skipped.
pub async fn read_intake_form(
    mut multipart: Multipart,
    config: &IntakeConfig,
) -> Result<(IntakeSubmissionDto, Vec<UploadedFile>)> {
    let mut fields = Map::new();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        if is_file_field(&field_name) {
            let name = display_name(field.file_name().unwrap_or_default());
            let declared = field.content_type().map(str::to_string);
            let data = read_file_part(&mut field, &name, config.max_file_size).await?;
            if data.is_empty() {
                tracing::debug!("Skipping empty file part '{}'", name);
                continue;
            }
            if files.len() >= config.max_files {
                return Err(too_many_files(config.max_files));
            }

            files.push(UploadedFile {
                content_type: resolve_content_type(declared.as_deref(), &name),
                name,
                data,
            });
            check_total_size(&files, config)?;
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            let value = if field_name == "consent" {
                Value::Bool(is_truthy(&text))
            } else {
                Value::String(text)
            };
            fields.insert(field_name, value);
        }
    }

    validate_files(&files, config)?;

    let dto = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;

    Ok((dto, files))
}

fn too_many_files(max: usize) -> AppError {
    AppError::BadRequest(format!("添付ファイルは{}件までです", max))
}

fn check_total_size(files: &[UploadedFile], config: &IntakeConfig) -> Result<()> {
    let total: usize = files.iter().map(UploadedFile::size).sum();
    if total > config.max_total_size {
        return Err(AppError::BadRequest(format!(
            "添付ファイルの合計サイズが上限（{}MB）を超えています",
            megabytes(config.max_total_size)
        )));
    }
    Ok(())
}

/// Count, size and content-type rules for intake attachments
pub fn validate_files(files: &[UploadedFile], config: &IntakeConfig) -> Result<()> {
    if files.len() > config.max_files {
        return Err(too_many_files(config.max_files));
    }

    for file in files {
        if file.size() > config.max_file_size {
            return Err(AppError::BadRequest(format!(
                "ファイル「{}」のサイズが上限（{}MB）を超えています",
                file.name,
                megabytes(config.max_file_size)
            )));
        }
        if !is_allowed(&file.content_type, INTAKE_CONTENT_TYPES) {
            return Err(AppError::BadRequest(format!(
                "ファイル「{}」の形式（{}）は添付できません",
                file.name, file.content_type
            )));
        }
    }

    check_total_size(files, config)
}
