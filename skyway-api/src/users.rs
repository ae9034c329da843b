use base64::Engine;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use skyway_core::user::{ProfileUpdate, RoleUpdate, Transaction};
use skyway_core::{validation, Role, User};
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::error::ApiResult;

/// `GET users/` has been seen both as a bare array and wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserListBody {
    Bare(Vec<User>),
    Wrapped { users: Vec<User> },
}

#[derive(Serialize)]
struct ProfilePicture<'s> {
    profile_picture: &'s str,
}

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<User>> {
        let body: UserListBody = self.client.get("users/", "Failed to load users").await?;
        Ok(match body {
            UserListBody::Bare(users) | UserListBody::Wrapped { users } => users,
        })
    }

    pub async fn get(&self, id: i64) -> ApiResult<User> {
        self.client
            .get(&format!("users/{}", id), "Failed to load user")
            .await
    }

    pub async fn update_role(&self, id: i64, role: Role) -> ApiResult<()> {
        self.client
            .call_unit(
                Method::PATCH,
                &format!("users/{}", id),
                Some(&RoleUpdate { role }),
                "Failed to update user role",
            )
            .await?;
        info!("Role of user {} set to {}", id, role);
        self.invalidate_if_current(id).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        self.client
            .call_unit(Method::PATCH, "users/", Some(update), "Failed to update profile")
            .await?;
        self.refresh_current().await
    }

    /// `picture` is a data URL or plain URL, sent as is.
    pub async fn update_profile_picture(&self, picture: &str) -> ApiResult<User> {
        self.client
            .call_unit(
                Method::PATCH,
                "users/",
                Some(&ProfilePicture { profile_picture: picture }),
                "Failed to update profile picture",
            )
            .await?;
        self.refresh_current().await
    }

    /// Validate an image and upload it as a base64 data URL.
    pub async fn upload_avatar(&self, content_type: &str, image: &[u8]) -> ApiResult<User> {
        validation::validate_avatar(content_type, image.len())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let data_url = format!("data:{};base64,{}", content_type, encoded);
        self.update_profile_picture(&data_url).await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client
            .delete(&format!("users/{}", id), "Failed to delete user")
            .await?;
        info!("Deleted user {}", id);
        Ok(())
    }

    /// `amount` is the raw input; it is sanitised and checked before sending.
    pub async fn deposit(&self, amount: &str) -> ApiResult<User> {
        let amount = validation::validate_deposit(&validation::sanitize_amount_input(amount))?;
        let body = Transaction { amount };
        self.client
            .call_unit(Method::PATCH, "users/deposit", Some(&body), "Deposit failed")
            .await?;
        info!("Deposited {:.2}", amount);
        self.refresh_current().await
    }

    /// Checked against the freshest known balance before sending.
    pub async fn withdraw(&self, amount: &str) -> ApiResult<User> {
        let current = self.current_user().await?;
        let amount = validation::validate_withdrawal(
            &validation::sanitize_amount_input(amount),
            current.account_balance,
        )?;
        let body = Transaction { amount };
        self.client
            .call_unit(Method::PATCH, "users/withdraw", Some(&body), "Withdrawal failed")
            .await?;
        info!("Withdrew {:.2}", amount);
        self.refresh_current().await
    }

    /// Re-fetch the signed-in user and rewrite the stored copy.
    pub async fn refresh_current(&self) -> ApiResult<User> {
        let session = self.client.require_session().await?;
        self.client.user_cache().invalidate().await;
        let user = self.get(session.user.user_id).await?;
        self.client.store_user(&user).await?;
        debug!("Refreshed user {}", user.user_id);
        Ok(user)
    }

    /// Cached user when fresh, otherwise a refetch.
    pub async fn current_user(&self) -> ApiResult<User> {
        match self.client.user_cache().get_fresh().await {
            Some(user) => Ok(user),
            None => self.refresh_current().await,
        }
    }

    async fn invalidate_if_current(&self, id: i64) -> ApiResult<()> {
        if let Some(session) = self.client.session().await? {
            if session.user.user_id == id {
                self.client.user_cache().invalidate().await;
            }
        }
        Ok(())
    }
}
