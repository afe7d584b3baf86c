//! TwiML document writer
//!
//! Maps each routing verb onto its TwiML element. Text and attribute values
//! are escaped by the XML writer.

use crate::domain::routing::{Dial, DialTarget, Markup, Record, Verb};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use thiserror::Error;

pub const TWIML_CONTENT_TYPE: &str = "text/xml";

/// Served when a document cannot be rendered: end the call cleanly
pub const FALLBACK_TWIML: &str =
    r#"<?xml version="1.0" encoding="UTF-8"?><Response><Hangup/></Response>"#;

#[derive(Error, Debug)]
#[error("TwiML render error: {0}")]
pub struct RenderError(String);

/// Render markup as a complete TwiML document
pub fn render(markup: &Markup) -> Result<String, RenderError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("Response")))?;

    for verb in markup.verbs() {
        match verb {
            Verb::Say(text) => text_element(&mut writer, BytesStart::new("Say"), text)?,
            Verb::Pause(seconds) => {
                let mut pause = BytesStart::new("Pause");
                pause.push_attribute(("length", seconds.to_string().as_str()));
                write(&mut writer, Event::Empty(pause))?;
            }
            Verb::Dial(dial) => write_dial(&mut writer, dial)?,
            Verb::Record(record) => write_record(&mut writer, record)?,
            Verb::Hangup => write(&mut writer, Event::Empty(BytesStart::new("Hangup")))?,
        }
    }

    write(&mut writer, Event::End(BytesEnd::new("Response")))?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| RenderError(e.to_string()))
}

fn write_dial(writer: &mut Writer<Cursor<Vec<u8>>>, dial: &Dial) -> Result<(), RenderError> {
    let mut element = BytesStart::new("Dial");
    element.push_attribute(("timeout", dial.timeout_seconds.to_string().as_str()));
    if let Some(caller_id) = &dial.caller_id {
        element.push_attribute(("callerId", caller_id.as_str()));
    }
    if let Some(action) = &dial.action {
        element.push_attribute(("action", action.as_str()));
        element.push_attribute(("method", "POST"));
    }
    write(writer, Event::Start(element))?;

    for target in &dial.targets {
        let noun = match target {
            DialTarget::Sip(_) => "Sip",
            DialTarget::Number(_) => "Number",
        };
        text_element(writer, BytesStart::new(noun), target.address())?;
    }

    write(writer, Event::End(BytesEnd::new("Dial")))
}

fn write_record(writer: &mut Writer<Cursor<Vec<u8>>>, record: &Record) -> Result<(), RenderError> {
    let mut element = BytesStart::new("Record");
    element.push_attribute(("maxLength", record.max_length_seconds.to_string().as_str()));
    element.push_attribute(("finishOnKey", record.finish_on_key.as_str()));
    element.push_attribute(("action", record.action.as_str()));
    element.push_attribute(("method", "POST"));
    if let Some(callback) = &record.status_callback {
        element.push_attribute(("recordingStatusCallback", callback.as_str()));
        element.push_attribute(("recordingStatusCallbackMethod", "POST"));
    }
    element.push_attribute(("playBeep", if record.play_beep { "true" } else { "false" }));

    write(writer, Event::Empty(element))
}

fn text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), RenderError> {
    let end = start.to_end().into_owned();
    write(writer, Event::Start(start))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(end))
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|e| RenderError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_say_and_hangup() {
        let xml = render(&Markup::new().say("Goodbye.").hangup()).unwrap();
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Say>Goodbye.</Say><Hangup/></Response>"#
        );
    }

    #[test]
    fn test_render_escapes_text() {
        let xml = render(&Markup::new().say("Smith & Sons <Fencing>")).unwrap();
        assert!(xml.contains("<Say>Smith &amp; Sons &lt;Fencing&gt;</Say>"));
    }

    #[test]
    fn test_render_dial() {
        let markup = Markup::new().dial(Dial {
            targets: vec![
                DialTarget::Sip("sip:desk1@office.example.com".to_string()),
                DialTarget::Number("+16175550199".to_string()),
            ],
            timeout_seconds: 20,
            caller_id: Some("+16175550100".to_string()),
            action: Some("/webhook/dial-status".to_string()),
        });

        let xml = render(&markup).unwrap();
        assert!(xml.contains(
            r#"<Dial timeout="20" callerId="+16175550100" action="/webhook/dial-status" method="POST">"#
        ));
        assert!(xml.contains("<Sip>sip:desk1@office.example.com</Sip>"));
        assert!(xml.contains("<Number>+16175550199</Number>"));
        assert!(xml.contains("</Dial>"));
    }

    #[test]
    fn test_render_record() {
        let markup = Markup::new().pause(1).record(Record {
            max_length_seconds: 120,
            finish_on_key: "#".to_string(),
            action: "/webhook/recording".to_string(),
            status_callback: Some("/webhook/recording-status".to_string()),
            play_beep: true,
        });

        let xml = render(&markup).unwrap();
        assert!(xml.contains(r#"<Pause length="1"/>"#));
        assert!(xml.contains(
            r##"<Record maxLength="120" finishOnKey="#" action="/webhook/recording" method="POST" recordingStatusCallback="/webhook/recording-status" recordingStatusCallbackMethod="POST" playBeep="true"/>"##
        ));
    }
}
