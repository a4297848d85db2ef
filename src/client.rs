use log::debug;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{BurndownError, Result};

const API_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Minimal Linear GraphQL client, used as an issue source for cycle burndowns.
pub struct LinearClient {
    http: Client,
    api_key: String,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize, Debug)]
struct GraphQLError {
    message: String,
}

impl<T> GraphQLResponse<T> {
    /// GraphQL errors win over partial data.
    fn into_data(self) -> Result<T> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(BurndownError::GraphQL {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        self.data.ok_or(BurndownError::EmptyResponse)
    }
}

impl LinearClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
        }
    }

    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T> {
        let request = GraphQLRequest { query, variables };

        let response = self
            .http
            .post(API_ENDPOINT)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Linear API responded with {status}");

        if !status.is_success() {
            return Err(BurndownError::ApiError {
                status: status.as_u16(),
                message: response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read response body>".to_string()),
            });
        }

        let gql_response: GraphQLResponse<T> = response.json().await?;
        gql_response.into_data()
    }
}
