use crate::card::{LaunchpadCard, LaunchpadContext};
use crate::config::Listener;
use crate::formatter::{FormatterError, GroupHashtagPromptCardFormatter};
use crate::metrics_defs::{CARD_FAILED, CARD_NOT_FOUND, CARD_RENDERED};
use crate::view_model::RenderedCard;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chameleon::request::CurrentRequest;
use chameleon::types::{MemberUrn, UrnError};
use serde::{Deserialize, Serialize};
use shared::counter;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const MEMBER_URN_HEADER: &str = "x-li-member-urn";
const ACCEPT_LANGUAGE_HEADER: &str = "accept-language";
const FORWARDED_HEADER_PREFIX: &str = "x-li-chameleon-";

#[derive(thiserror::Error, Debug)]
pub enum CardApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("missing {MEMBER_URN_HEADER} header")]
    MissingMember,
    #[error("invalid member urn: {0}")]
    InvalidMember(UrnError),
    #[error(transparent)]
    Format(#[from] FormatterError),
    #[error("card formatting task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub fn router(formatter: Arc<GroupHashtagPromptCardFormatter>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/launchpad/cards/group-hashtag-prompt",
            post(group_hashtag_prompt_card),
        )
        .with_state(formatter)
}

pub async fn serve(
    listener: Listener,
    formatter: Arc<GroupHashtagPromptCardFormatter>,
) -> Result<(), CardApiError> {
    let app = router(formatter);
    let addr = format!("{}:{}", listener.host, listener.port);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Card API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error_message: String,
}

#[derive(Deserialize, Debug)]
struct Params {
    #[serde(default)]
    context: LaunchpadContext,
    cta_type: String,
}

async fn health() -> &'static str {
    "ok"
}

async fn group_hashtag_prompt_card(
    State(formatter): State<Arc<GroupHashtagPromptCardFormatter>>,
    Query(params): Query<Params>,
    headers: HeaderMap,
    Json(card): Json<LaunchpadCard>,
) -> Result<Json<RenderedCard>, CardApiError> {
    let request = current_request(&headers).inspect_err(|_| {
        counter!(CARD_FAILED).increment(1);
    })?;

    // Resolution blocks on the config source.
    let result = tokio::task::spawn_blocking(move || {
        formatter.format_card(&request, params.context, &params.cta_type, &card)
    })
    .await;

    match result {
        Ok(Ok(rendered)) => {
            counter!(CARD_RENDERED).increment(1);
            Ok(Json(rendered))
        }
        Ok(Err(e)) => {
            if e.is_not_found() {
                counter!(CARD_NOT_FOUND).increment(1);
            } else {
                counter!(CARD_FAILED).increment(1);
            }
            Err(e.into())
        }
        Err(e) => {
            counter!(CARD_FAILED).increment(1);
            Err(e.into())
        }
    }
}

fn current_request(headers: &HeaderMap) -> Result<CurrentRequest, CardApiError> {
    let member = headers
        .get(MEMBER_URN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(CardApiError::MissingMember)?
        .parse::<MemberUrn>()
        .map_err(CardApiError::InvalidMember)?;

    let mut request = CurrentRequest::new(member);

    if let Some(accept_language) = headers
        .get(ACCEPT_LANGUAGE_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        request = request.with_accept_language(accept_language);
    }

    for (name, value) in headers {
        if !name.as_str().starts_with(FORWARDED_HEADER_PREFIX) {
            continue;
        }
        match value.to_str() {
            Ok(value) => request = request.with_header(name.as_str(), value),
            Err(_) => tracing::warn!(header = %name, "Dropping non-ascii chameleon header"),
        }
    }

    Ok(request)
}

impl IntoResponse for FormatterError {
    fn into_response(self) -> Response {
        let status = match self {
            FormatterError::InvalidGroupUrn(_) => StatusCode::BAD_REQUEST,
            FormatterError::InvalidDeeplink(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::NOT_FOUND,
        };

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl IntoResponse for CardApiError {
    fn into_response(self) -> Response {
        let error = match self {
            CardApiError::Format(e) => return e.into_response(),
            other => other,
        };

        let status = match error {
            CardApiError::MissingMember | CardApiError::InvalidMember(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => {
                tracing::error!(error = %error, "Card request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ApiErrorResponse {
            error_message: error.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::localization::StaticLocalizationService;
    use axum::body::{Body, to_bytes};
    use chameleon::group_trending_hashtag::{
        GroupTrendingHashtagService, group_trending_hashtag_config_type,
    };
    use chameleon::payload::ChameleonConfig;
    use chameleon::testutils::{FakeConfigSource, RecordingSensor};
    use http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const CARD_PATH: &str = "/launchpad/cards/group-hashtag-prompt?context=GROUPS&cta_type=start_post";

    fn app() -> (Arc<FakeConfigSource>, Router) {
        let source = Arc::new(FakeConfigSource::default());
        let service =
            GroupTrendingHashtagService::new(source.clone(), Arc::new(RecordingSensor::default()));
        let config: Config =
            serde_yaml::from_str("share_url: https://www.linkedin.com/share").unwrap();
        let formatter = GroupHashtagPromptCardFormatter::new(
            service,
            Arc::new(StaticLocalizationService::default()),
            &config,
        );
        (source, router(Arc::new(formatter)))
    }

    fn card_body(group_urn: &str) -> Body {
        Body::from(
            json!({
                "cardType": "evtgroups__actions__start_a_post_1",
                "attributes": [{"type": "GROUP_URN", "relatedEntities": [group_urn]}],
                "legoTrackingToken": "tracking token",
            })
            .to_string(),
        )
    }

    fn card_request(member: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(CARD_PATH)
            .header("content-type", "application/json")
            .header("accept-language", "en-US,en;q=0.8")
            .header("x-li-chameleon-ec-test_id", "1")
            .header("x-forwarded-for", "10.0.0.1");
        if let Some(member) = member {
            builder = builder.header(MEMBER_URN_HEADER, member);
        }
        builder.body(body).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health() {
        let (_, app) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn renders_card() {
        let (source, app) = app();
        source.push_configs(vec![ChameleonConfig::new(
            group_trending_hashtag_config_type().to_string(),
            json!({"hashtagCards": [{
                "hashtag": "#FirstHashtag",
                "cardImage": "urn:li:chameleon:external:voyager-api:group-trending-hashtag-cardImage:ill_spt_main_conversation_small",
            }]}),
        )]);

        let response = app
            .oneshot(card_request(Some("urn:li:member:100"), card_body("urn:li:group:12345")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["title"]["text"], "#FirstHashtag");
        assert_eq!(body["subtitle"]["text"], "");
        assert_eq!(body["cta"]["ctaType"], "start_post");
        assert_eq!(body["cta"]["ctaStyle"], "PRIMARY");
        assert_eq!(
            body["cta"]["deeplinkUrl"],
            "https://www.linkedin.com/share?text=%0D%0D%23FirstHashtag&hint=Start+a+post&trk=tracking+token"
        );
        assert_eq!(
            body["backgroundImage"]["attributes"][0]["systemImage"],
            "ILL_SPT_MAIN_CONVERSATION_SMALL"
        );
        assert_eq!(
            body["pageKey"]["pageKey"],
            "p_flagship3_launchpad_card_evtgroups_actions"
        );

        let headers = source.last_headers().unwrap();
        assert_eq!(headers.get("x-li-chameleon-ec-test_id").map(String::as_str), Some("1"));
        assert!(!headers.contains_key("x-forwarded-for"));
    }

    #[tokio::test]
    async fn missing_member_is_bad_request() {
        let (source, app) = app();
        let response = app
            .oneshot(card_request(None, card_body("urn:li:group:12345")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(source.queries().is_empty());
    }

    #[tokio::test]
    async fn invalid_group_is_bad_request() {
        let (_, app) = app();
        let response = app
            .oneshot(card_request(Some("urn:li:member:100"), card_body("urn:li:company:1")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(
            body["error_message"]
                .as_str()
                .unwrap()
                .contains("urn:li:company:1")
        );
    }

    #[tokio::test]
    async fn group_without_config_is_not_found() {
        let (_, app) = app();
        let response = app
            .oneshot(card_request(Some("urn:li:member:100"), card_body("urn:li:group:12345")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(
            body["error_message"],
            "no group trending hashtag configs for group 12345"
        );
    }
}
