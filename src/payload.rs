use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Json, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::catalog::CreatePayload;
use crate::error::ApiError;
use crate::image::ImageInput;

/// Multipart field carrying the image, either as a file or as inline text
const IMAGE_FIELD: &str = "imagem";

/// Form fields of a create request; `imagem` may also be a file part in multipart bodies
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateForm {
    nome: Option<String>,
    ingredientes: Option<String>,
    preco: Option<String>,
    preco_pequeno: Option<String>,
    preco_medio: Option<String>,
    preco_grande: Option<String>,
    imagem: Option<String>,
}

/// JSON clients may send pizza prices nested under `preco`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonPrice {
    Sized {
        #[serde(default, deserialize_with = "scalar_text")]
        pequeno: Option<String>,
        #[serde(default, deserialize_with = "scalar_text")]
        medio: Option<String>,
        #[serde(default, deserialize_with = "scalar_text")]
        grande: Option<String>,
    },
    Text(#[serde(deserialize_with = "scalar_text")] Option<String>),
}

/// JSON body of a create request; any scalar is accepted where text is stored
#[derive(Debug, Default, Deserialize)]
struct JsonFields {
    #[serde(default, deserialize_with = "scalar_text")]
    nome: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    ingredientes: Option<String>,
    preco: Option<JsonPrice>,
    #[serde(default, deserialize_with = "scalar_text")]
    preco_pequeno: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    preco_medio: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    preco_grande: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    imagem: Option<String>,
}

/// Numbers and booleans keep their JSON spelling; `null` counts as missing
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string, number or boolean, found {}",
            other
        ))),
    }
}

fn inline_image(value: Option<String>) -> ImageInput {
    match value {
        Some(payload) if !payload.is_empty() => ImageInput::Inline(payload),
        _ => ImageInput::Absent,
    }
}

impl From<CreateForm> for CreatePayload {
    fn from(fields: CreateForm) -> Self {
        CreatePayload {
            nome: fields.nome,
            ingredientes: fields.ingredientes,
            preco: fields.preco,
            preco_pequeno: fields.preco_pequeno,
            preco_medio: fields.preco_medio,
            preco_grande: fields.preco_grande,
            imagem: inline_image(fields.imagem),
        }
    }
}

impl From<JsonFields> for CreatePayload {
    fn from(fields: JsonFields) -> Self {
        let mut payload = CreatePayload {
            nome: fields.nome,
            ingredientes: fields.ingredientes,
            preco: None,
            preco_pequeno: fields.preco_pequeno,
            preco_medio: fields.preco_medio,
            preco_grande: fields.preco_grande,
            imagem: inline_image(fields.imagem),
        };

        match fields.preco {
            Some(JsonPrice::Text(preco)) => payload.preco = preco,
            Some(JsonPrice::Sized { pequeno, medio, grande }) => {
                payload.preco_pequeno = pequeno.or(payload.preco_pequeno);
                payload.preco_medio = medio.or(payload.preco_medio);
                payload.preco_grande = grande.or(payload.preco_grande);
            }
            None => {}
        }

        payload
    }
}

/// Reads a create payload from multipart, JSON or urlencoded bodies
///
/// A request without a recognised content type, or a JSON request with an
/// empty body, carries no fields and yields the all-default payload.
impl<S> FromRequest<S> for CreatePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let bytes = Bytes::from_request(req, state).await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(CreatePayload::default());
            }
            let Json(fields) = Json::<JsonFields>::from_bytes(&bytes)?;
            Ok(fields.into())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<CreateForm>::from_request(req, state).await?;
            Ok(fields.into())
        } else {
            tracing::debug!("No readable body for content type '{}'", content_type);
            Ok(CreatePayload::default())
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<CreatePayload, ApiError> {
    let mut payload = CreatePayload::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_owned);
            payload.imagem = match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty, unnamed part when no file was picked
                    if file_name.is_empty() && bytes.is_empty() {
                        ImageInput::Absent
                    } else {
                        ImageInput::Upload {
                            file_name: Some(file_name).filter(|name| !name.is_empty()),
                            bytes,
                        }
                    }
                }
                None => inline_image(Some(field.text().await?)),
            };
            continue;
        }

        let slot = match name.as_str() {
            "nome" => &mut payload.nome,
            "ingredientes" => &mut payload.ingredientes,
            "preco" => &mut payload.preco,
            "preco_pequeno" => &mut payload.preco_pequeno,
            "preco_medio" => &mut payload.preco_medio,
            "preco_grande" => &mut payload.preco_grande,
            _ => continue,
        };
        *slot = Some(field.text().await?);
    }

    Ok(payload)
}
