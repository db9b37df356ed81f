//! Turning one HTTP exchange into an upload outcome or a failed attempt

use receiptdrop_transport::HttpResponse;

use crate::error::{Error, Result};
use crate::types::{Receipt, UploadOutcome, UploadResponse};

/// Classify the response to a single attempt.
///
/// `Ok` is final and ends the retry loop, whether the server accepted the
/// receipt or reported a definitive failure. `Err` means the attempt failed
/// and may be retried.
pub fn classify_response(response: &HttpResponse) -> Result<UploadOutcome> {
    if !response.is_success() {
        return Err(Error::Status {
            status: response.status,
            body: response.text(),
        });
    }

    let parsed: Option<UploadResponse> = response.json().map_err(|e| {
        let content_type = response.get_header("content-type").unwrap_or("unknown");
        Error::Protocol(format!("undecodable {content_type} body: {e}"))
    })?;
    let Some(parsed) = parsed else {
        return Err(Error::Protocol("empty body".to_string()));
    };

    classify_body(parsed)
}

fn classify_body(body: UploadResponse) -> Result<UploadOutcome> {
    if !body.success {
        return match body.error.filter(|e| !e.is_empty()) {
            Some(message) => Ok(UploadOutcome::Failure { message }),
            None => Err(Error::Protocol(
                "success is false but no error was given".to_string(),
            )),
        };
    }

    let receipt_id = body
        .receipt_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Protocol("success without a receipt_id".to_string()))?;

    Ok(UploadOutcome::Success(Receipt {
        receipt_id,
        db_integration: body.db_integration,
        transaction_id: body.transaction_id,
        client_id: body.client_id,
        storage_type: body.storage_type,
    }))
}
