//! Multipart category form extraction and validation.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::{header, HeaderMap, StatusCode};
use bytes::Bytes;

use catalog_core::validation::non_blank;
use catalog_core::{Error, FieldErrors, Result};

pub const NAME_REQUIRED: &str = "Enter the category name";
pub const IMAGE_REQUIRED: &str = "Provide the category image";
pub const DESCRIPTION_REQUIRED: &str = "Enter the category description";

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the client; only its extension is used.
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Raw values of a submitted category form.
///
/// Text fields are trimmed and blank values are `None`. A file part with no
/// bytes is treated as no upload.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

/// Validated input for a new category.
#[derive(Debug, Clone)]
pub struct CreateInput {
    pub name: String,
    pub description: String,
    pub image: Upload,
}

/// Validated input for an update. `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UpdateInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Upload>,
}

impl CategoryForm {
    /// Read the form from a request body.
    ///
    /// A body that does not claim to be multipart (absent, JSON, urlencoded)
    /// carries no form fields, so it reads as an empty form and validation
    /// reports each missing field. A multipart content type with a bad
    /// boundary is still a malformed request.
    pub async fn read(
        headers: &HeaderMap,
        multipart: std::result::Result<Multipart, MultipartRejection>,
    ) -> Result<Self> {
        match multipart {
            Ok(multipart) => Self::from_multipart(multipart).await,
            Err(_) if !is_multipart(headers) => {
                tracing::debug!("Request body is not multipart; reading an empty form");
                Ok(Self::default())
            }
            Err(rejection) => Err(Error::Validation(rejection.body_text())),
        }
    }

    /// Read every part of a `multipart/form-data` body.
    ///
    /// Unknown fields are skipped. When a field repeats, the last one wins.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(field_name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field_name.as_str() {
                "name" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    form.name = non_blank(Some(&text));
                }
                "description" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    form.description = non_blank(Some(&text));
                }
                "image" => {
                    let file_name = field.file_name().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.image = if bytes.is_empty() {
                        None
                    } else {
                        Some(Upload { file_name, bytes })
                    };
                }
                other => {
                    tracing::debug!(field = other, "Ignoring unknown form field");
                }
            }
        }

        Ok(form)
    }

    /// Require every field.
    pub fn into_create(self) -> Result<CreateInput> {
        let mut errors = FieldErrors::new();
        if self.name.is_none() {
            errors.add("name", NAME_REQUIRED);
        }
        if self.image.is_none() {
            errors.add("image", IMAGE_REQUIRED);
        }
        if self.description.is_none() {
            errors.add("description", DESCRIPTION_REQUIRED);
        }

        match (self.name, self.description, self.image) {
            (Some(name), Some(description), Some(image)) => Ok(CreateInput {
                name,
                description,
                image,
            }),
            _ => Err(Error::InvalidFields(errors)),
        }
    }

    /// Require only the name.
    pub fn into_update(self) -> Result<UpdateInput> {
        let Some(name) = self.name else {
            let mut errors = FieldErrors::new();
            errors.add("name", NAME_REQUIRED);
            return Err(Error::InvalidFields(errors));
        };

        Ok(UpdateInput {
            name,
            description: self.description,
            image: self.image,
        })
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/"))
        .unwrap_or(false)
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::TooLarge(e.body_text())
    } else {
        Error::Validation(format!("malformed multipart body: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "X-CATALOG-BOUNDARY";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn parse(parts: &[Part<'_>]) -> CategoryForm {
        let multipart = Multipart::from_request(multipart_request(parts), &())
            .await
            .unwrap();
        CategoryForm::from_multipart(multipart).await.unwrap()
    }

    #[tokio::test]
    async fn reads_text_and_file_parts() {
        let form = parse(&[
            Part::Text("name", "  Shoes "),
            Part::Text("description", "For feet"),
            Part::File("image", "shoe.PNG", b"\x89PNG"),
            Part::Text("csrf", "ignored"),
        ])
        .await;

        assert_eq!(form.name.as_deref(), Some("Shoes"));
        assert_eq!(form.description.as_deref(), Some("For feet"));
        let image = form.image.unwrap();
        assert_eq!(image.file_name.as_deref(), Some("shoe.PNG"));
        assert_eq!(&image.bytes[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn blank_values_and_empty_files_are_missing() {
        let form = parse(&[
            Part::Text("name", "   "),
            Part::Text("description", ""),
            Part::File("image", "", b""),
        ])
        .await;

        assert!(form.name.is_none());
        assert!(form.description.is_none());
        assert!(form.image.is_none());
    }

    async fn read_request(request: Request<Body>) -> Result<CategoryForm> {
        let headers = request.headers().clone();
        let multipart = Multipart::from_request(request, &()).await;
        CategoryForm::read(&headers, multipart).await
    }

    #[tokio::test]
    async fn non_multipart_bodies_read_as_empty_forms() {
        let json = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Shoes"}"#))
            .unwrap();
        let form = read_request(json).await.unwrap();
        assert!(form.name.is_none());
        assert!(form.description.is_none());
        assert!(form.image.is_none());

        let bare = Request::post("/").body(Body::empty()).unwrap();
        let form = read_request(bare).await.unwrap();
        assert!(form.name.is_none());
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_malformed() {
        let request = Request::post("/")
            .header("content-type", "multipart/form-data")
            .body(Body::from("name=Shoes"))
            .unwrap();
        let err = read_request(request).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn read_passes_multipart_through() {
        let form = read_request(multipart_request(&[Part::Text("name", "Hats")]))
            .await
            .unwrap();
        assert_eq!(form.name.as_deref(), Some("Hats"));
    }

    #[test]
    fn create_reports_every_missing_field() {
        let Error::InvalidFields(fields) = CategoryForm::default().into_create().unwrap_err()
        else {
            panic!("expected field errors");
        };
        assert_eq!(fields.get("name"), Some(&[NAME_REQUIRED.to_string()][..]));
        assert_eq!(fields.get("image"), Some(&[IMAGE_REQUIRED.to_string()][..]));
        assert_eq!(
            fields.get("description"),
            Some(&[DESCRIPTION_REQUIRED.to_string()][..])
        );
    }

    #[test]
    fn create_reports_only_the_missing_field() {
        let form = CategoryForm {
            name: Some("Hats".into()),
            description: None,
            image: Some(Upload {
                file_name: None,
                bytes: Bytes::from_static(b"x"),
            }),
        };
        let Error::InvalidFields(fields) = form.into_create().unwrap_err() else {
            panic!("expected field errors");
        };
        assert_eq!(fields.fields().collect::<Vec<_>>(), vec!["description"]);
    }

    #[test]
    fn update_needs_only_a_name() {
        let form = CategoryForm {
            name: Some("Hats".into()),
            ..Default::default()
        };
        let input = form.into_update().unwrap();
        assert_eq!(input.name, "Hats");
        assert!(input.description.is_none());
        assert!(input.image.is_none());

        let Error::InvalidFields(fields) = CategoryForm::default().into_update().unwrap_err()
        else {
            panic!("expected field errors");
        };
        assert_eq!(fields.fields().collect::<Vec<_>>(), vec!["name"]);
    }
}
