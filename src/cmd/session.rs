/*!
session.rs - `login`, `logout`, `status`.

These are the only commands that write the session file. They take the
`SessionStore` directly instead of a `CommandContext`.

  login aad|graph        device-code sign-in for the fixed resource
  login spo --url <site> device-code sign-in for the site's tenant origin
  logout [service]       forget one connection, or all of them
  status                 one row per service
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};
use tracing::info;

use crate::auth::login::DeviceCodeLogin;
use crate::auth::{Connection, Service, SessionStore};
use crate::config::AppConfig;
use crate::error::CommandError;
use crate::utils::{odata, validate};

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Service to connect to
    #[arg(value_enum)]
    pub service: Service,

    /// SharePoint Online site URL (spo only)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    pub service: Service,
    pub resource: String,
}

impl LoginArgs {
    pub fn validate(&self) -> Result<LoginOptions, CommandError> {
        let resource = match self.service.fixed_resource() {
            Some(resource) => {
                if self.url.is_some() {
                    return Err(CommandError::Validation(format!(
                        "Option url is not supported when logging in to {}",
                        self.service.display_name()
                    )));
                }
                resource.to_string()
            }
            None => {
                let url = validate::required("url", self.url.as_deref())
                    .map_err(CommandError::Validation)?;
                validate::sharepoint_url("url", url).map_err(CommandError::Validation)?;
                odata::origin(url).ok_or_else(|| {
                    CommandError::Validation(format!("{url} in option url is not a valid URL"))
                })?
            }
        };
        Ok(LoginOptions {
            service: self.service,
            resource,
        })
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct LogoutArgs {
    /// Service to disconnect from (all when omitted)
    #[arg(value_enum)]
    pub service: Option<Service>,
}

pub async fn login(
    opts: &LoginOptions,
    config: &AppConfig,
    flow: &DeviceCodeLogin,
    store: &SessionStore,
) -> Result<Value> {
    info!(service = %opts.service, resource = %opts.resource, "Logging in...");
    let connection = flow.login(config, &opts.resource).await?;

    let mut session = store.load()?;
    *session.connection_mut(opts.service) = connection;
    store.save(&session)?;

    info!("DONE");
    Ok(Value::String(format!(
        "Logged in to {} ({})",
        opts.service.display_name(),
        opts.resource
    )))
}

pub fn logout(args: &LogoutArgs, store: &SessionStore) -> Result<Value> {
    let mut session = store.load()?;
    let services = match args.service {
        Some(service) => vec![service],
        None => Service::all().to_vec(),
    };
    for service in services {
        *session.connection_mut(service) = Connection::default();
        info!(%service, "disconnected");
    }
    store.save(&session)?;
    Ok(Value::Null)
}

pub fn status(store: &SessionStore) -> Result<Value> {
    let session = store.load()?;
    let rows = Service::all()
        .iter()
        .map(|&service| {
            let conn = session.connection(service);
            json!({
                "service": service.display_name(),
                "connected": conn.connected,
                "resource": conn.resource,
                "tokenValid": conn.connected && conn.token_valid(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MS_GRAPH_RESOURCE;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn login_args(service: Service, url: Option<&str>) -> LoginArgs {
        LoginArgs {
            service,
            url: url.map(str::to_string),
        }
    }

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session-default.json"));
        (dir, store)
    }

    #[test]
    fn login_validation() {
        assert_eq!(
            login_args(Service::Graph, None).validate().unwrap().resource,
            MS_GRAPH_RESOURCE
        );
        assert!(
            login_args(Service::Aad, Some("https://contoso.sharepoint.com"))
                .validate()
                .is_err()
        );
        assert_eq!(
            login_args(Service::Spo, None).validate().unwrap_err(),
            CommandError::Validation("Required option url missing".into())
        );
        assert!(login_args(Service::Spo, Some("https://contoso.com")).validate().is_err());
        assert_eq!(
            login_args(Service::Spo, Some("https://contoso.sharepoint.com/sites/ninja"))
                .validate()
                .unwrap()
                .resource,
            "https://contoso.sharepoint.com"
        );
    }

    #[tokio::test]
    async fn login_persists_connection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/common/oauth2/v2.0/devicecode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "device_code": "dc",
                "user_code": "UC",
                "verification_uri": "https://microsoft.com/devicelogin",
                "interval": 0
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/common/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ABC",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let (_dir, store) = store();
        let opts = login_args(Service::Graph, None).validate().unwrap();
        let flow = DeviceCodeLogin::new(server.uri());
        let out = login(&opts, &AppConfig::default(), &flow, &store)
            .await
            .unwrap();
        assert_eq!(
            out,
            Value::String("Logged in to Microsoft Graph (https://graph.microsoft.com)".into())
        );

        let session = store.load().unwrap();
        assert!(session.graph.connected);
        assert_eq!(session.graph.access_token.as_deref(), Some("ABC"));
        assert!(!session.aad.connected);
    }

    #[test]
    fn logout_one_or_all() {
        let (_dir, store) = store();
        let mut session = crate::auth::Session::default();
        session.aad = Connection::connected_to("https://graph.windows.net", "A");
        session.spo = Connection::connected_to("https://contoso.sharepoint.com", "S");
        store.save(&session).unwrap();

        logout(&LogoutArgs { service: Some(Service::Spo) }, &store).unwrap();
        let after = store.load().unwrap();
        assert!(after.aad.connected);
        assert!(!after.spo.connected);

        logout(&LogoutArgs::default(), &store).unwrap();
        assert_eq!(store.load().unwrap(), crate::auth::Session::default());
    }

    #[test]
    fn status_lists_every_service() {
        let (_dir, store) = store();
        let mut session = crate::auth::Session::default();
        session.graph = Connection::connected_to(MS_GRAPH_RESOURCE, "G");
        store.save(&session).unwrap();

        let rows = status(&store).unwrap();
        assert_eq!(
            rows,
            json!([
                {"service": "Azure Active Directory Graph", "connected": false, "resource": null, "tokenValid": false},
                {"service": "Microsoft Graph", "connected": true, "resource": "https://graph.microsoft.com", "tokenValid": true},
                {"service": "SharePoint Online", "connected": false, "resource": null, "tokenValid": false}
            ])
        );
    }
}
