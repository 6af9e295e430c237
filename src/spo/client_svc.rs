//! SharePoint CSOM access over the `ProcessQuery` JSON-over-HTTP protocol.
//!
//! Writes (and some reads that plain REST does not expose, like web property
//! bags and tenant settings) go through `_vti_bin/client.svc/ProcessQuery`:
//! a POSTed CSOM XML request, authorized by a request digest, answered with a
//! JSON array whose first element is a result envelope.

use anyhow::{anyhow, bail, Result};
use log::debug;
use serde_json::Value;

use crate::api::transport::Transport;

const REQUEST_PREAMBLE: &str = r#"<Request AddExpandoFieldTypeSuffix="true" SchemaVersion="15.0.0.0" LibraryVersion="16.0.0.0" ApplicationName="m365-cli" xmlns="http://schemas.microsoft.com/sharepoint/clientquery/2009">"#;

const CURRENT_WEB_IDENTITY_REQUEST: &str = r#"<Actions><ObjectPath Id="5" ObjectPathId="3" /><ObjectIdentityQuery Id="6" ObjectPathId="3" /><Query Id="7" ObjectPathId="3"><Query SelectAllProperties="false"><Properties><Property Name="ServerRelativeUrl" ScalarProperty="true" /></Properties></Query></Query></Actions><ObjectPaths><StaticProperty Id="1" TypeId="{3747adcd-a3c3-41b9-bfab-4a64dd2f1e0a}" Name="Current" /><Property Id="3" ParentId="1" Name="Web" /></ObjectPaths></Request>"#;

const TENANT_SETTINGS_REQUEST: &str = r#"<Actions><ObjectPath Id="4" ObjectPathId="3" /><Query Id="5" ObjectPathId="3"><Query SelectAllProperties="true"><Properties /></Query></Query></Actions><ObjectPaths><Constructor Id="3" TypeId="{268004ae-ef6b-4e9b-8425-127220d84719}" /></ObjectPaths></Request>"#;

/// CSOM identity of a web, needed to scope subsequent object queries.
#[derive(Debug, Clone)]
pub struct IdentityResponse {
    pub object_identity: String,
    pub server_relative_url: String,
}

pub struct ClientSvc<'a> {
    transport: &'a dyn Transport,
}

impl<'a> ClientSvc<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Obtains a form digest for `web_url` via `_api/contextinfo`.
    pub async fn request_digest(&self, web_url: &str) -> Result<String> {
        let url = format!("{}/_api/contextinfo", web_url.trim_end_matches('/'));
        let response = self.transport.post(&url, &[], None).await?;

        response
            .get("FormDigestValue")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Could not retrieve a request digest for {}", web_url))
    }

    /// Executes a raw CSOM request and returns the response payload after
    /// checking the result envelope. A populated `ErrorInfo` in the envelope
    /// fails the call with the server's `ErrorMessage`; the trace metadata
    /// around it is discarded.
    pub async fn process_query(
        &self,
        web_url: &str,
        form_digest: &str,
        request_xml: &str,
    ) -> Result<Vec<Value>> {
        let url = format!(
            "{}/_vti_bin/client.svc/ProcessQuery",
            web_url.trim_end_matches('/')
        );
        debug!("ProcessQuery against {}", url);

        let response = self
            .transport
            .post(
                &url,
                &[
                    ("Content-Type", "text/xml"),
                    ("X-RequestDigest", form_digest),
                ],
                Some(request_xml.to_string()),
            )
            .await?;

        let payload = response
            .as_array()
            .ok_or_else(|| anyhow!("Unexpected ProcessQuery response from {}", url))?;

        if let Some(error_info) = payload.first().and_then(|envelope| envelope.get("ErrorInfo")) {
            if !error_info.is_null() {
                let message = error_info
                    .get("ErrorMessage")
                    .and_then(Value::as_str)
                    .unwrap_or("ClientSvc unknown error");
                bail!("{}", message);
            }
        }

        Ok(payload.to_vec())
    }

    /// Resolves the CSOM object identity of the web at `web_url`.
    pub async fn current_web_identity(
        &self,
        web_url: &str,
        form_digest: &str,
    ) -> Result<IdentityResponse> {
        let request_xml = format!("{}{}", REQUEST_PREAMBLE, CURRENT_WEB_IDENTITY_REQUEST);
        let payload = self
            .process_query(web_url, form_digest, &request_xml)
            .await?;

        let object_identity = payload
            .iter()
            .find_map(|element| element.get("_ObjectIdentity_").and_then(Value::as_str))
            .ok_or_else(|| anyhow!("Cannot establish the identity of the site {}", web_url))?
            .to_string();
        let server_relative_url = payload
            .iter()
            .find_map(|element| element.get("ServerRelativeUrl").and_then(Value::as_str))
            .unwrap_or("/")
            .to_string();

        Ok(IdentityResponse {
            object_identity,
            server_relative_url,
        })
    }

    /// Retrieves the property bag of the web identified by `identity`, as a
    /// flat object of decorated key/value entries.
    pub async fn web_property_bag(
        &self,
        web_url: &str,
        form_digest: &str,
        identity: &IdentityResponse,
    ) -> Result<Value> {
        let request_xml = format!(
            r#"{}<Actions><ObjectPath Id="97" ObjectPathId="96" /><Query Id="98" ObjectPathId="96"><Query SelectAllProperties="false"><Properties><Property Name="AllProperties" SelectAll="true"><Query SelectAllProperties="false"><Properties /></Query></Property></Properties></Query></Query></Actions><ObjectPaths><Identity Id="96" Name="{}" /></ObjectPaths></Request>"#,
            REQUEST_PREAMBLE,
            xml_escape(&identity.object_identity)
        );
        let payload = self
            .process_query(web_url, form_digest, &request_xml)
            .await?;

        payload
            .last()
            .and_then(|element| element.get("AllProperties"))
            .cloned()
            .ok_or_else(|| anyhow!("Cannot retrieve the property bag of {}", web_url))
    }

    /// Retrieves the property bag of a folder given by its site-relative
    /// URL.
    pub async fn folder_property_bag(
        &self,
        web_url: &str,
        form_digest: &str,
        identity: &IdentityResponse,
        folder: &str,
    ) -> Result<Value> {
        let server_relative_url = join_server_relative(&identity.server_relative_url, folder);
        let request_xml = format!(
            r#"{}<Actions><ObjectPath Id="10" ObjectPathId="9" /><ObjectPath Id="12" ObjectPathId="11" /><Query Id="13" ObjectPathId="11"><Query SelectAllProperties="false"><Properties><Property Name="Properties" SelectAll="true"><Query SelectAllProperties="false"><Properties /></Query></Property></Properties></Query></Query></Actions><ObjectPaths><Identity Id="9" Name="{}" /><Method Id="11" ParentId="9" Name="GetFolderByServerRelativeUrl"><Parameters><Parameter Type="String">{}</Parameter></Parameters></Method></ObjectPaths></Request>"#,
            REQUEST_PREAMBLE,
            xml_escape(&identity.object_identity),
            xml_escape(&server_relative_url)
        );
        let payload = self
            .process_query(web_url, form_digest, &request_xml)
            .await?;

        payload
            .last()
            .and_then(|element| element.get("Properties"))
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "Cannot retrieve the property bag of folder {} in {}",
                    folder,
                    web_url
                )
            })
    }

    /// Retrieves the raw tenant settings object from the tenant admin site.
    pub async fn tenant_settings(&self, admin_url: &str, form_digest: &str) -> Result<Value> {
        let request_xml = format!("{}{}", REQUEST_PREAMBLE, TENANT_SETTINGS_REQUEST);
        let payload = self
            .process_query(admin_url, form_digest, &request_xml)
            .await?;

        payload
            .last()
            .filter(|element| element.is_object())
            .cloned()
            .ok_or_else(|| anyhow!("Cannot retrieve the tenant settings from {}", admin_url))
    }
}

fn join_server_relative(web_relative_url: &str, folder: &str) -> String {
    let base = web_relative_url.trim_end_matches('/');
    let folder = folder.trim_start_matches('/');
    if folder.is_empty() {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{}/{}", base, folder)
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::StubTransport;
    use serde_json::json;

    const WEB_URL: &str = "https://contoso.sharepoint.com/sites/test";

    #[test]
    fn joins_folder_paths() {
        assert_eq!(join_server_relative("/sites/test", "/"), "/sites/test");
        assert_eq!(
            join_server_relative("/sites/test", "/Shared Documents"),
            "/sites/test/Shared Documents"
        );
        assert_eq!(
            join_server_relative("/", "Lists/MyList"),
            "/Lists/MyList"
        );
    }

    #[test]
    fn escapes_xml_parameters() {
        assert_eq!(xml_escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[tokio::test]
    async fn retrieves_request_digest() {
        let transport = StubTransport::new().on_post(
            "https://contoso.sharepoint.com/sites/test/_api/contextinfo",
            json!({ "FormDigestValue": "ABC", "FormDigestTimeoutSeconds": 1800 }),
        );

        let digest = ClientSvc::new(&transport)
            .request_digest(WEB_URL)
            .await
            .unwrap();
        assert_eq!(digest, "ABC");
    }

    #[tokio::test]
    async fn surfaces_error_info_message() {
        let transport = StubTransport::new().on_post(
            "https://contoso-admin.sharepoint.com/_vti_bin/client.svc/ProcessQuery",
            json!([
                {
                    "SchemaVersion": "15.0.0.0",
                    "LibraryVersion": "16.0.7018.1204",
                    "ErrorInfo": {
                        "ErrorMessage": "Timed out",
                        "ErrorValue": null,
                        "TraceCorrelationId": "2df74b9e-c022-5000-1529-309f2cd00843",
                        "ErrorCode": -1,
                        "ErrorTypeName": "Microsoft.SharePoint.Client.ServerException"
                    },
                    "TraceCorrelationId": "2df74b9e-c022-5000-1529-309f2cd00843"
                }
            ]),
        );

        let err = ClientSvc::new(&transport)
            .tenant_settings("https://contoso-admin.sharepoint.com", "abc")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Timed out");
    }

    #[tokio::test]
    async fn parses_current_web_identity() {
        let transport = StubTransport::new().on_post(
            "https://contoso.sharepoint.com/sites/test/_vti_bin/client.svc/ProcessQuery",
            json!([
                { "SchemaVersion": "15.0.0.0", "ErrorInfo": null, "TraceCorrelationId": "abc" },
                6,
                {
                    "_ObjectIdentity_": "d704ae73-d5ed-459e-80b0-b8103c5fb6e0|8f2be65d-f195-4699-b0de-24aca3384ba9:site:0ead8b78-89e5-427f-b1bc-6e5a77ac191c:web:4c076c07-e3f1-49a8-ad01-dbb70b263cd7",
                    "ServerRelativeUrl": "\u{002f}sites\u{002f}test"
                }
            ]),
        );

        let identity = ClientSvc::new(&transport)
            .current_web_identity(WEB_URL, "abc")
            .await
            .unwrap();
        assert!(identity.object_identity.contains(":web:"));
        assert_eq!(identity.server_relative_url, "/sites/test");
    }

    #[tokio::test]
    async fn retrieves_web_property_bag() {
        let transport = StubTransport::new().on_post(
            "https://contoso.sharepoint.com/sites/test/_vti_bin/client.svc/ProcessQuery",
            json!([
                { "SchemaVersion": "15.0.0.0", "ErrorInfo": null, "TraceCorrelationId": "abc" },
                98,
                {
                    "_ObjectType_": "SP.Web",
                    "AllProperties": {
                        "_ObjectType_": "SP.PropertyValues",
                        "vti_level$  Int32": 1,
                        "vti_defaultlanguage": "en-us"
                    }
                }
            ]),
        );

        let identity = IdentityResponse {
            object_identity: "id".to_string(),
            server_relative_url: "/sites/test".to_string(),
        };
        let bag = ClientSvc::new(&transport)
            .web_property_bag(WEB_URL, "abc", &identity)
            .await
            .unwrap();
        assert_eq!(bag["vti_defaultlanguage"], "en-us");
    }

    #[tokio::test]
    async fn process_query_sends_digest_header_and_body() {
        let transport = StubTransport::new().on_post(
            "https://contoso.sharepoint.com/sites/test/_vti_bin/client.svc/ProcessQuery",
            json!([{ "ErrorInfo": null }]),
        );

        ClientSvc::new(&transport)
            .process_query(WEB_URL, "abc", "<Request />")
            .await
            .unwrap();

        let bodies = transport.post_bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].1.as_deref(), Some("<Request />"));
    }
}
