use api_types::{
    Ack,
    payment::{Payment, PaymentResponse, PaymentUpdate, PaymentsResponse},
    plot::{Plot, PlotPayload, PlotResponse, PlotsResponse},
    stk::StkPush,
};
use engine::{Receipt, ReceiptOptions, build_receipt};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ClientError;

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// CollectPro REST backend. Every call carries a Firebase ID token.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<TReq: Serialize + ?Sized, TResp: DeserializeOwned + Default>(
        &self,
        method: Method,
        segments: &[&str],
        token: &str,
        body: Option<&TReq>,
    ) -> Result<TResp, ClientError> {
        let endpoint = self.endpoint(segments)?;
        tracing::debug!(%method, path = endpoint.path(), "backend request");

        let mut req = self.http.request(method, endpoint).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;

        let status = res.status();
        if status.is_success() {
            let bytes = res.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(TResp::default());
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = res.json::<ErrorResponse>().await.unwrap_or_default();
        let message = body
            .error
            .or(body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        tracing::warn!(status = status.as_u16(), %message, "backend request failed");

        let err = match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(message),
            422 => ClientError::Validation(message),
            _ => ClientError::Server(message),
        };
        Err(err)
    }

    async fn get<TResp: DeserializeOwned + Default>(
        &self,
        segments: &[&str],
        token: &str,
    ) -> Result<TResp, ClientError> {
        self.call::<(), TResp>(Method::GET, segments, token, None)
            .await
    }

    /// Write calls answer with `{success, message}`; `success: false` is a
    /// failure even on 2xx.
    async fn write<TReq: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        token: &str,
        body: Option<&TReq>,
    ) -> Result<Ack, ClientError> {
        let ack: Ack = self.call(method, segments, token, body).await?;
        if ack.is_rejected() {
            return Err(ClientError::Rejected(
                ack.text().unwrap_or("request failed").to_string(),
            ));
        }
        Ok(ack)
    }

    pub async fn plots(&self, token: &str) -> Result<Vec<Plot>, ClientError> {
        let res: PlotsResponse = self.get(&["api", "plots", "getplots"], token).await?;
        Ok(res.plots)
    }

    pub async fn plot(&self, token: &str, id: &str) -> Result<Plot, ClientError> {
        let res: Option<PlotResponse> = self.get(&["api", "plots", id], token).await?;
        res.map(|res| res.plot).ok_or(ClientError::NotFound)
    }

    pub async fn register_plot(
        &self,
        token: &str,
        payload: &PlotPayload,
    ) -> Result<Ack, ClientError> {
        self.write(
            Method::POST,
            &["api", "plots", "registerplot"],
            token,
            Some(payload),
        )
        .await
    }

    pub async fn update_plot(
        &self,
        token: &str,
        id: &str,
        payload: &PlotPayload,
    ) -> Result<Ack, ClientError> {
        self.write(Method::PUT, &["api", "plots", id], token, Some(payload))
            .await
    }

    pub async fn delete_plot(&self, token: &str, id: &str) -> Result<Ack, ClientError> {
        self.write::<()>(Method::DELETE, &["api", "plots", id], token, None)
            .await
    }

    pub async fn payments(&self, token: &str) -> Result<Vec<Payment>, ClientError> {
        let res: PaymentsResponse = self.get(&["api", "payments"], token).await?;
        if res.success == Some(false) {
            return Err(ClientError::Rejected(
                res.message
                    .unwrap_or_else(|| "Failed to fetch payments".to_string()),
            ));
        }
        Ok(res.payments)
    }

    pub async fn payment(&self, token: &str, id: &str) -> Result<Payment, ClientError> {
        let res: Option<PaymentResponse> = self.get(&["api", "payments", id], token).await?;
        res.map(|res| res.payment).ok_or(ClientError::NotFound)
    }

    /// Builds a receipt from the backend's current copy of the payment.
    pub async fn receipt(
        &self,
        token: &str,
        id: &str,
        options: &ReceiptOptions,
    ) -> Result<Receipt, ClientError> {
        let payment = self.payment(token, id).await?;
        Ok(build_receipt(&payment, options))
    }

    pub async fn update_payment(
        &self,
        token: &str,
        id: &str,
        update: &PaymentUpdate,
    ) -> Result<Ack, ClientError> {
        self.write(Method::PUT, &["api", "payments", id], token, Some(update))
            .await
    }

    pub async fn delete_payment(&self, token: &str, id: &str) -> Result<Ack, ClientError> {
        self.write::<()>(Method::DELETE, &["api", "payments", id], token, None)
            .await
    }

    pub async fn stk_push(&self, token: &str, push: &StkPush) -> Result<Ack, ClientError> {
        self.write(Method::POST, &["api", "stk"], token, Some(push))
            .await
    }
}
