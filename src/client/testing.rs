//! In-crate fakes for the HTTP and clock collaborators.

use std::error::Error as StdError;
use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use super::{BoxFuture, Clock, HttpResponse, HttpTransport};

#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

#[derive(Debug)]
struct FakeTransportState {
    calls: usize,
    last_url: Option<String>,
    last_body: Option<String>,
    response: Result<HttpResponse, String>,
}

impl FakeTransport {
    pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
        Self::with_response(Ok(HttpResponse {
            status: response_status,
            body: response_body.into(),
        }))
    }

    pub(crate) fn failing(message: impl Into<String>) -> Self {
        Self::with_response(Err(message.into()))
    }

    fn with_response(response: Result<HttpResponse, String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                calls: 0,
                last_url: None,
                last_body: None,
                response,
            })),
        }
    }

    pub(crate) fn last_request(&self) -> (Option<String>, Option<String>) {
        let state = self.state.lock().unwrap();
        (state.last_url.clone(), state.last_body.clone())
    }

    pub(crate) fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

impl HttpTransport for FakeTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = {
                let mut state = self.state.lock().unwrap();
                state.calls += 1;
                state.last_url = Some(url.to_owned());
                state.last_body = Some(body);
                state.response.clone()
            };
            response.map_err(|message| {
                Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, message))
                    as Box<dyn StdError + Send + Sync>
            })
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FixedClock {
    now: DateTime<Utc>,
    nonce: String,
}

impl FixedClock {
    /// 2024-01-02T03:04:05Z with nonce `nonce-1`.
    pub(crate) fn new() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            nonce: "nonce-1".to_owned(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn nonce(&self) -> String {
        self.nonce.clone()
    }
}
