//! STS `GetCallerIdentityResponse` XML decoding.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

use crate::error::DecodeError;
use crate::model::Identity;

const RESPONSE_ELEMENT: &str = "GetCallerIdentityResponse";
const RESULT_ELEMENT: &str = "GetCallerIdentityResult";

/// Decode a `GetCallerIdentityResponse` envelope into an [`Identity`].
///
/// `ResponseMetadata` and any other sibling elements are ignored.
///
/// # Errors
///
/// Returns [`DecodeError`] if the XML is malformed, the root is not
/// `GetCallerIdentityResponse`, or `Arn`, `UserId` or `Account` is missing.
pub fn decode_caller_identity(xml: &[u8]) -> Result<Identity, DecodeError> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let root = element_name(e.local_name().as_ref())?;
                if root != RESPONSE_ELEMENT {
                    return Err(DecodeError::UnexpectedElement(root));
                }
                return read_response(&mut reader);
            }
            Event::Eof => {
                return Err(DecodeError::MissingElement(RESPONSE_ELEMENT.to_owned()));
            }
            _ => {}
        }
    }
}

fn read_response(reader: &mut Reader<&[u8]>) -> Result<Identity, DecodeError> {
    let mut identity = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if element_name(e.local_name().as_ref())? == RESULT_ELEMENT {
                    identity = Some(read_result(reader)?);
                } else {
                    skip_element(reader)?;
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(RESPONSE_ELEMENT)),
            _ => {}
        }
    }

    identity.ok_or_else(|| DecodeError::MissingElement(RESULT_ELEMENT.to_owned()))
}

fn read_result(reader: &mut Reader<&[u8]>) -> Result<Identity, DecodeError> {
    let mut arn = None;
    let mut user_id = None;
    let mut account = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match element_name(e.local_name().as_ref())?.as_str() {
                "Arn" => arn = Some(read_text_content(reader)?),
                "UserId" => user_id = Some(read_text_content(reader)?),
                "Account" => account = Some(read_text_content(reader)?),
                _ => skip_element(reader)?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(RESULT_ELEMENT)),
            _ => {}
        }
    }

    Ok(Identity {
        arn: arn.ok_or_else(|| DecodeError::MissingElement("Arn".to_owned()))?,
        user_id: user_id.ok_or_else(|| DecodeError::MissingElement("UserId".to_owned()))?,
        account: account.ok_or_else(|| DecodeError::MissingElement("Account".to_owned()))?,
    })
}

fn element_name(raw: &[u8]) -> Result<String, DecodeError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| DecodeError::Text(e.to_string()))
}

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, DecodeError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e.decode().map_err(|err| DecodeError::Text(err.to_string()))?;
                text.push_str(&decoded);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| DecodeError::Text(err.to_string()))?
                {
                    text.push(ch);
                    continue;
                }
                let name = e.decode().map_err(|err| DecodeError::Text(err.to_string()))?;
                let resolved = resolve_predefined_entity(&name)
                    .ok_or_else(|| DecodeError::Text(format!("unknown entity &{name};")))?;
                text.push_str(resolved);
            }
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(unexpected_eof("text content")),
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), DecodeError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => return Err(unexpected_eof("skipped element")),
            _ => {}
        }
    }
}

fn unexpected_eof(context: &str) -> DecodeError {
    DecodeError::UnexpectedElement(format!("unexpected EOF in {context}"))
}
