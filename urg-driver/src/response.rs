use crate::codec::to_string;
use crate::error::UrgError;

/// Raw lines of one response, terminators included, without the final empty line.
pub(crate) type ResponseBlock = Vec<Vec<u8>>;

/// Check the echo line and the status line of a response.
pub(crate) fn validate_response(
    block: &[Vec<u8>],
    echo: &[u8],
    accepted_status: &[&[u8]],
) -> Result<(), UrgError> {
    let actual_echo = block.first().map(Vec::as_slice).unwrap_or_default();
    if actual_echo != echo {
        return Err(UrgError::ProtocolMismatch(
            to_string(echo),
            to_string(actual_echo),
        ));
    }

    let status = block.get(1).map(Vec::as_slice).unwrap_or_default();
    if !accepted_status.iter().any(|s| *s == status) {
        let expected = accepted_status
            .iter()
            .map(|s| to_string(s))
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(UrgError::ProtocolMismatch(expected, to_string(status)));
    }
    Ok(())
}
