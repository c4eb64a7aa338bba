use crate::error::{PipelineError, Result};
use crate::models::image_types::ImageBytes;
use crate::models::prediction_types::ClassificationResult;
use crate::services::{image_prep, multipart};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

#[async_trait]
pub trait BreedClassifier: Send + Sync {
    async fn classify(&self, image: &ImageBytes) -> Result<ClassificationResult>;
}

/// Talks to the classification service's `POST {base_url}/predict`.
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    base_url: String,
    jpeg_quality: u8,
}

impl HttpClassifier {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            jpeg_quality: image_prep::DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn predict_url(&self) -> Result<Url> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));
        Url::parse(&url).map_err(|e| PipelineError::InvalidEndpoint(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl BreedClassifier for HttpClassifier {
    async fn classify(&self, image: &ImageBytes) -> Result<ClassificationResult> {
        let url = self.predict_url()?;
        let jpeg = image_prep::to_jpeg(image.as_bytes(), self.jpeg_quality)?;

        let boundary = multipart::new_boundary();
        let body = multipart::encode(&jpeg, &boundary);
        tracing::debug!(%url, body_bytes = body.len(), "Sending image for classification");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, multipart::content_type(&boundary))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Classification service returned a non-success status");
        }

        let bytes = response.bytes().await?;
        decode_prediction(&bytes)
    }
}

/// Parses the `/predict` body. Anything short of a complete, well-formed
/// result is a decoding failure; partial results are never returned.
pub fn decode_prediction(body: &[u8]) -> Result<ClassificationResult> {
    let prediction: ClassificationResult = serde_json::from_slice(body)
        .map_err(|e| PipelineError::DecodingFailed(e.to_string()))?;

    if !prediction.confidence.is_finite() || !(0.0..=1.0).contains(&prediction.confidence) {
        return Err(PipelineError::DecodingFailed(format!(
            "confidence {} outside [0, 1]",
            prediction.confidence
        )));
    }

    Ok(prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::image_prep::sample_png;
    use mockito::{Matcher, Server};

    #[test]
    fn predict_url_joins_base_url() {
        let classifier = HttpClassifier::new(Client::new(), "http://localhost:8000/");
        assert_eq!(
            classifier.predict_url().unwrap().as_str(),
            "http://localhost:8000/predict"
        );
    }

    #[test]
    fn malformed_base_url_is_invalid_endpoint() {
        let classifier = HttpClassifier::new(Client::new(), "not a url");
        assert!(matches!(
            classifier.predict_url(),
            Err(PipelineError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_confidence() {
        let body = br#"{"status":"ok","predicted_breed":"pug","confidence":1.5,"message":""}"#;
        assert!(matches!(
            decode_prediction(body),
            Err(PipelineError::DecodingFailed(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let body = br#"{"status":"ok","confidence":0.4,"message":""}"#;
        assert!(matches!(
            decode_prediction(body),
            Err(PipelineError::DecodingFailed(_))
        ));
    }

    #[tokio::test]
    async fn classify_posts_multipart_jpeg_and_decodes_result() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=[0-9a-f-]{36}$".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"ok","predicted_breed":"golden_retriever","confidence":0.95,"message":""}"#,
            )
            .create_async()
            .await;

        let classifier = HttpClassifier::new(Client::new(), server.url());
        let result = classifier
            .classify(&ImageBytes::from(sample_png()))
            .await
            .expect("classification should succeed");

        mock.assert_async().await;
        assert_eq!(result.breed_label, "golden_retriever");
        assert_eq!(result.status, "ok");
        assert_eq!(result.confidence, 0.95);
    }

    #[tokio::test]
    async fn non_json_body_is_decoding_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let classifier = HttpClassifier::new(Client::new(), server.url());
        let err = classifier
            .classify(&ImageBytes::from(sample_png()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, PipelineError::DecodingFailed(_)));
    }

    #[tokio::test]
    async fn unencodable_image_never_reaches_the_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .expect(0)
            .create_async()
            .await;

        let classifier = HttpClassifier::new(Client::new(), server.url());
        let err = classifier
            .classify(&ImageBytes::from(Vec::new()))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, PipelineError::ImageEncodingFailed(_)));
    }
}
