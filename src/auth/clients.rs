use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};

use crate::{config::AuthConfig, AppResult};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

/// OAuth2 client for the user pool's hosted sign-in.
#[derive(Clone)]
pub struct Clients {
    user_pool: HappyClient,
}

impl Clients {
    pub fn from_config(config: &AuthConfig) -> AppResult<Clients> {
        let domain = config.domain.trim_end_matches('/');

        let auth_url = AuthUrl::new(format!("{domain}/oauth2/authorize"))?;
        let token_url = TokenUrl::new(format!("{domain}/oauth2/token"))?;
        let redirect_url = RedirectUrl::new(config.redirect_url.clone())?;

        let mut user_pool = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);
        if let Some(secret) = &config.client_secret {
            user_pool = user_pool.set_client_secret(ClientSecret::new(secret.clone()));
        }

        Ok(Clients { user_pool })
    }

    pub fn get_client(&self) -> HappyClient {
        self.user_pool.clone()
    }
}
