use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};

use crate::{
    Credentials, EngineError, NewUserCmd, ResultEngine, UpdateUserCmd, User,
    users::{self, encode_labels},
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

const DEFAULT_CURRENCY: &str = "USD";

fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = normalize_required_text(email, "email")?.to_lowercase();
    if !email.contains('@') {
        return Err(EngineError::InvalidArgument(format!("invalid email: {email}")));
    }
    Ok(email)
}

fn unique_violation(email: &str) -> impl FnOnce(DbErr) -> EngineError + '_ {
    move |err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(email.to_string()),
        _ => EngineError::Database(err),
    }
}

impl Engine {
    /// Register a new user. Emails are unique, compared case-insensitively.
    pub async fn sign_up(&self, cmd: NewUserCmd) -> ResultEngine<User> {
        let first_name = normalize_required_text(&cmd.first_name, "first name")?;
        let last_name = normalize_required_text(&cmd.last_name, "last name")?;
        let email = normalize_email(&cmd.email)?;
        if cmd.password_hash.is_empty() {
            return Err(EngineError::InvalidArgument(
                "password must not be empty".to_string(),
            ));
        }
        let now = Utc::now();

        let user = with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                email: ActiveValue::Set(email.clone()),
                password: ActiveValue::Set(cmd.password_hash),
                contact: ActiveValue::Set(normalize_optional_text(cmd.contact.as_deref())),
                accounts: ActiveValue::Set(encode_labels(&cmd.accounts)),
                country: ActiveValue::Set(None),
                currency: ActiveValue::Set(DEFAULT_CURRENCY.to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await
            .map_err(unique_violation(&email))?;
            Ok(User::from(model))
        })?;

        tracing::info!(user_id = user.id, "user signed up");
        Ok(user)
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            Ok(User::from(model))
        })
    }

    /// Look a user up by email, together with the stored password hash.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Credentials> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .map(Credentials::from)
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
        })
    }

    /// Patch profile fields. Fields left as `None` are not touched.
    pub async fn update_user(&self, user_id: i32, cmd: UpdateUserCmd) -> ResultEngine<User> {
        let email = cmd.email.as_deref().map(normalize_email).transpose()?;
        let first_name = cmd
            .first_name
            .as_deref()
            .map(|name| normalize_required_text(name, "first name"))
            .transpose()?;
        let last_name = cmd
            .last_name
            .as_deref()
            .map(|name| normalize_required_text(name, "last name"))
            .transpose()?;
        let currency = cmd
            .currency
            .as_deref()
            .map(|currency| normalize_required_text(currency, "currency"))
            .transpose()?;

        let user = with_tx!(self, |db_tx| {
            let current = self.require_user(&db_tx, user_id).await?;

            if let Some(email) = &email
                && *email != current.email
            {
                let taken = users::Entity::find()
                    .filter(users::Column::Email.eq(email.clone()))
                    .filter(users::Column::Id.ne(user_id))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if taken {
                    return Err(EngineError::ExistingKey(email.clone()));
                }
            }

            let current_email = current.email.clone();
            let mut model: users::ActiveModel = current.into();
            if let Some(first_name) = first_name {
                model.first_name = ActiveValue::Set(first_name);
            }
            if let Some(last_name) = last_name {
                model.last_name = ActiveValue::Set(last_name);
            }
            if let Some(email) = &email {
                model.email = ActiveValue::Set(email.clone());
            }
            if let Some(contact) = cmd.contact.as_deref() {
                model.contact = ActiveValue::Set(normalize_optional_text(Some(contact)));
            }
            if let Some(country) = cmd.country.as_deref() {
                model.country = ActiveValue::Set(normalize_optional_text(Some(country)));
            }
            if let Some(currency) = currency {
                model.currency = ActiveValue::Set(currency);
            }
            if let Some(labels) = &cmd.accounts {
                model.accounts = ActiveValue::Set(encode_labels(labels));
            }
            model.updated_at = ActiveValue::Set(Utc::now());

            let conflicting = email.unwrap_or(current_email);
            let model = model
                .update(&db_tx)
                .await
                .map_err(unique_violation(&conflicting))?;
            Ok(User::from(model))
        })?;

        tracing::info!(user_id, "user updated");
        Ok(user)
    }

    /// Replace the stored password hash.
    pub async fn set_password(&self, user_id: i32, password_hash: String) -> ResultEngine<()> {
        if password_hash.is_empty() {
            return Err(EngineError::InvalidArgument(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let current = self.require_user(&db_tx, user_id).await?;
            let mut model: users::ActiveModel = current.into();
            model.password = ActiveValue::Set(password_hash);
            model.updated_at = ActiveValue::Set(Utc::now());
            model.update(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(user_id, "password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Jane@Example.COM "),
            Ok("jane@example.com".to_string())
        );
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}
