use serde::{Deserialize, Serialize};

use crate::{FxError, Result};

/// Whether the guest will attend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
}

impl std::str::FromStr for Attendance {
    type Err = FxError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "yes" => Ok(Attendance::Yes),
            "no" => Ok(Attendance::No),
            _ => Err(FxError::InvalidInput("attendance must be `yes` or `no`")),
        }
    }
}

/// Body posted to the RSVP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpSubmission {
    pub name: String,
    #[serde(default)]
    pub message: String,
    pub attendance: Attendance,
}

impl RsvpSubmission {
    /// Builds a submission from raw form fields. Returns `None` when the name
    /// or attendance is missing, in which case the form is left untouched.
    pub fn from_form(name: &str, message: &str, attendance: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let attendance = attendance.parse().ok()?;

        Some(Self {
            name: name.to_string(),
            message: message.to_string(),
            attendance,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Reply from the RSVP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpResponse {
    #[serde(default)]
    pub success: bool,
}

impl RsvpResponse {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Sends a submission and returns the endpoint's raw JSON reply.
pub trait RsvpTransport {
    fn post(&mut self, endpoint: &str, body: &str) -> Result<String>;
}

/// What the page does after a submission round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpOutcome {
    /// Hide the form and show the thank-you note; celebrate attending guests.
    Confirmed { celebrate: bool },
    /// The endpoint declined; restore the submit button.
    Rejected,
    /// The request or its reply failed; restore the submit button.
    Failed,
}

impl RsvpOutcome {
    pub fn resolve(submission: &RsvpSubmission, reply: Result<RsvpResponse>) -> Self {
        match reply {
            Ok(RsvpResponse { success: true }) => RsvpOutcome::Confirmed {
                celebrate: submission.attendance == Attendance::Yes,
            },
            Ok(_) => {
                tracing::warn!(name = %submission.name, "RSVP rejected by endpoint");
                RsvpOutcome::Rejected
            }
            Err(err) => {
                tracing::warn!(%err, "RSVP request failed");
                RsvpOutcome::Failed
            }
        }
    }

    pub fn should_celebrate(&self) -> bool {
        matches!(self, RsvpOutcome::Confirmed { celebrate: true })
    }
}

/// Posts `submission` through `transport` and resolves the outcome.
pub fn submit<T: RsvpTransport + ?Sized>(
    transport: &mut T,
    endpoint: &str,
    submission: &RsvpSubmission,
) -> RsvpOutcome {
    let reply = submission
        .to_json()
        .and_then(|body| transport.post(endpoint, &body))
        .and_then(|raw| RsvpResponse::from_json(&raw));
    RsvpOutcome::resolve(submission, reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedTransport {
        reply: Option<&'static str>,
        sent: Vec<(String, String)>,
    }

    impl RsvpTransport for CannedTransport {
        fn post(&mut self, endpoint: &str, body: &str) -> Result<String> {
            self.sent.push((endpoint.to_string(), body.to_string()));
            self.reply
                .map(str::to_string)
                .ok_or_else(|| FxError::msg("connection refused"))
        }
    }

    fn transport(reply: Option<&'static str>) -> CannedTransport {
        CannedTransport {
            reply,
            sent: Vec::new(),
        }
    }

    #[test]
    fn incomplete_forms_are_ignored() {
        assert!(RsvpSubmission::from_form("", "hi", "yes").is_none());
        assert!(RsvpSubmission::from_form("  ", "hi", "yes").is_none());
        assert!(RsvpSubmission::from_form("Asha", "hi", "").is_none());
        assert!(RsvpSubmission::from_form("Asha", "", "maybe").is_none());
    }

    #[test]
    fn serialises_the_request_body() {
        let submission = RsvpSubmission::from_form("Asha", "See you!", "yes").unwrap();
        let json: serde_json::Value = serde_json::from_str(&submission.to_json().unwrap()).unwrap();

        assert_eq!(json["name"], "Asha");
        assert_eq!(json["message"], "See you!");
        assert_eq!(json["attendance"], "yes");
    }

    #[test]
    fn attending_guests_get_confetti() {
        let submission = RsvpSubmission::from_form("Asha", "", "yes").unwrap();
        let mut transport = transport(Some(r#"{"success":true}"#));

        let outcome = submit(&mut transport, "https://example.test/rsvp", &submission);
        assert_eq!(outcome, RsvpOutcome::Confirmed { celebrate: true });
        assert!(outcome.should_celebrate());
        assert_eq!(transport.sent[0].0, "https://example.test/rsvp");
    }

    #[test]
    fn declining_guests_are_confirmed_quietly() {
        let submission = RsvpSubmission::from_form("Ravi", "", "no").unwrap();
        let outcome = submit(&mut transport(Some(r#"{"success":true}"#)), "e", &submission);
        assert_eq!(outcome, RsvpOutcome::Confirmed { celebrate: false });
    }

    #[test]
    fn rejected_and_failed_replies() {
        let submission = RsvpSubmission::from_form("Asha", "", "yes").unwrap();
        assert_eq!(
            submit(&mut transport(Some(r#"{"success":false}"#)), "e", &submission),
            RsvpOutcome::Rejected
        );
        assert_eq!(
            submit(&mut transport(Some("{}")), "e", &submission),
            RsvpOutcome::Rejected
        );
        assert_eq!(
            submit(&mut transport(Some("<html>")), "e", &submission),
            RsvpOutcome::Failed
        );
        assert_eq!(
            submit(&mut transport(None), "e", &submission),
            RsvpOutcome::Failed
        );
    }
}
