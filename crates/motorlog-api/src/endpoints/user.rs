use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiResponse, ProfileUpdate, User};
use crate::routes;

impl ApiClient {
    /// The signed-in user.
    pub async fn get_user(&self) -> Result<ApiResponse<User>, Error> {
        self.get(routes::USER.path()).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ApiResponse<User>, Error> {
        self.put(routes::PROFILE.path(), update).await
    }
}
