//! JSON-over-HTTP binding to the apparatus service.

use async_trait::async_trait;
use operant_core::{
    ActuatorChannel, GatewayError, GatewayResult, HardwareGateway, InteractionCounts, RgbState,
    TrialConfiguration,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Switch {
    On,
    Off,
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on { Switch::On } else { Switch::Off }
    }
}

#[derive(Serialize, Debug)]
struct ChannelRequest {
    action: Switch,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RgbWire {
    red: Switch,
    green: Switch,
    blue: Switch,
}

impl From<RgbState> for RgbWire {
    fn from(rgb: RgbState) -> Self {
        Self {
            red: rgb.red.into(),
            green: rgb.green.into(),
            blue: rgb.blue.into(),
        }
    }
}

impl From<RgbWire> for RgbState {
    fn from(wire: RgbWire) -> Self {
        RgbState::new(
            wire.red == Switch::On,
            wire.green == Switch::On,
            wire.blue == Switch::On,
        )
    }
}

#[derive(Deserialize, Debug)]
struct RgbAck {
    rgb: RgbWire,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::rejected(status.as_u16(), body))
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> GatewayResult<Response> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(body)).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> GatewayResult<T> {
    response
        .json()
        .await
        .map_err(|e| GatewayError::Decode(e.to_string()))
}

fn channel_path(channel: ActuatorChannel) -> String {
    format!("/light/{}", channel.label())
}

#[async_trait]
impl HardwareGateway for HttpGateway {
    async fn interaction_counts(&self) -> GatewayResult<InteractionCounts> {
        let response = self.send(self.client.get(self.url("/counts"))).await?;
        decode(response).await
    }

    async fn set_channel(&self, channel: ActuatorChannel, on: bool) -> GatewayResult<()> {
        let body = ChannelRequest { action: on.into() };
        self.post(&channel_path(channel), &body).await?;
        Ok(())
    }

    async fn set_rgb(&self, rgb: RgbState) -> GatewayResult<RgbState> {
        let response = self.post("/light/rgb", &RgbWire::from(rgb)).await?;
        let ack: RgbAck = decode(response).await?;
        Ok(ack.rgb.into())
    }

    async fn start_trial(&self, config: &TrialConfiguration) -> GatewayResult<()> {
        self.post("/test/run", config).await?;
        Ok(())
    }

    async fn stop_trial(&self) -> GatewayResult<()> {
        self.post("/test/stop", &serde_json::json!({})).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_request_body() {
        let body = serde_json::to_value(ChannelRequest { action: true.into() }).unwrap();
        assert_eq!(body, json!({ "action": "on" }));
        assert_eq!(channel_path(ActuatorChannel::Orange), "/light/orange");
    }

    #[test]
    fn rgb_request_body() {
        let body = serde_json::to_value(RgbWire::from(RgbState::new(true, false, true))).unwrap();
        assert_eq!(body, json!({ "red": "on", "green": "off", "blue": "on" }));
    }

    #[test]
    fn rgb_ack_decodes_to_state() {
        let ack: RgbAck = serde_json::from_value(json!({
            "status": "success",
            "rgb": { "red": "off", "green": "on", "blue": "off" }
        }))
        .unwrap();
        assert_eq!(RgbState::from(ack.rgb), RgbState::new(false, true, false));
    }

    #[test]
    fn counts_decode() {
        let counts: InteractionCounts =
            serde_json::from_value(json!({ "lever_press_count": 12, "nose_poke_count": 3 }))
                .unwrap();
        assert_eq!(counts, InteractionCounts::new(12, 3));
    }

    #[test]
    fn base_url_trailing_slash() {
        let gateway = HttpGateway::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.url("/counts"), "http://127.0.0.1:5000/counts");
    }

    #[tokio::test]
    async fn unreachable_gateway_is_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let gateway = HttpGateway::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = gateway.interaction_counts().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
