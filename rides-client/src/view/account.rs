//! Account registration

use std::path::PathBuf;

use derivative::Derivative;
use reqwest::multipart::{Form, Part};
use rides::Role;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::Api;
use crate::view::Result;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing {0}")]
    MissingField(&'static str),
    #[error("Drivers have to provide the {0}")]
    MissingDriverDetail(&'static str),
    #[error("Cannot read document {path:?}: {source}")]
    Document {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// New account details
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[derivative(Debug = "ignore")]
    pub password: String,
    pub phone: String,
    pub role: Role,
    /// Driving license number
    pub license: Option<String>,
    pub car_model: Option<String>,
    pub plate: Option<String>,
    /// Scanned identity document
    pub document: Option<PathBuf>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.trim().is_empty())
}

impl Registration {
    pub fn validate(&self) -> Result<(), Error> {
        for (value, field) in [
            (&self.name, "name"),
            (&self.email, "email"),
            (&self.password, "password"),
        ] {
            if value.trim().is_empty() {
                return Err(Error::MissingField(field));
            }
        }

        if self.role == Role::Driver {
            for (value, field) in [
                (&self.license, "driving license number"),
                (&self.car_model, "car model"),
                (&self.plate, "car plate"),
            ] {
                if !filled(value) {
                    return Err(Error::MissingDriverDetail(field));
                }
            }

            if self.document.is_none() {
                return Err(Error::MissingDriverDetail("document"));
            }
        }

        Ok(())
    }

    async fn into_form(self) -> Result<Form, Error> {
        let mut form = Form::new()
            .text("nome", self.name.trim().to_owned())
            .text("email", self.email.trim().to_owned())
            .text("senha", self.password)
            .text("telefone", self.phone.trim().to_owned())
            .text("tipo", self.role.as_str());

        for (name, value) in [
            ("numero_cnh", self.license),
            ("modelo_carro", self.car_model),
            ("placa_carro", self.plate),
        ] {
            if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
                form = form.text(name, value.trim().to_owned());
            }
        }

        if let Some(path) = self.document {
            let content = tokio::fs::read(&path)
                .await
                .map_err(|source| Error::Document {
                    path: path.clone(),
                    source,
                })?;

            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "documento".to_owned());

            form = form.part("documento", Part::bytes(content).file_name(file_name));
        }

        Ok(form)
    }
}

/// Validates and sends the registration
#[instrument(skip_all, fields(email = %registration.email, role = %registration.role))]
pub async fn register(api: &Api, registration: Registration) -> Result<()> {
    registration.validate()?;
    let form = registration.into_form().await?;
    api.register(form).await?;

    info!("Account registered");
    Ok(())
}
