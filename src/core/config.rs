use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub web_ui_path: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_token_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("NOOK_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let web_ui_path = env::var("NOOK_WEB_UI_PATH").unwrap_or_else(|_| "./web-ui".to_string());
        let google_client_id =
            env::var("NOOK_GOOGLE_CLIENT_ID").expect("Missing NOOK_GOOGLE_CLIENT_ID");
        let google_client_secret =
            env::var("NOOK_GOOGLE_CLIENT_SECRET").expect("Missing NOOK_GOOGLE_CLIENT_SECRET");
        let google_redirect_uri = env::var("NOOK_GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());
        let google_token_url = env::var("NOOK_GOOGLE_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string());

        Self {
            db_path,
            web_ui_path,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_token_url,
        }
    }
}
