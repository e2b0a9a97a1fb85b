//! Mail sink: one message per record through a [`MailTransport`].

use logtree_domain::{LogRecord, SinkError};
use logtree_ports::{Sink, SinkFactory, SinkSection};
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};

/// Identifier of the mail sink.
pub const MAIL_SINK_TYPE: &str = "mail";

/// Recipient used when a section sets none.
pub const DEFAULT_MAIL_TO: &str = "admin@example.com";

/// Subject used when a section sets none.
pub const DEFAULT_SUBJECT: &str = "Log message";

/// Sendmail binary used when a section sets none.
pub const DEFAULT_SENDMAIL_PATH: &str = "/usr/sbin/sendmail";

const HISTORY_HEADING: &str = "Recent history:";

/// Outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// `To` address.
    pub to: String,
    /// Optional `From` address.
    pub from: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Extra raw header lines.
    pub headers: Vec<String>,
    /// Body text.
    pub body: String,
}

impl MailMessage {
    /// RFC 5322 text with CRLF header lines, ready for `sendmail -t`.
    #[must_use]
    pub fn to_rfc5322(&self) -> String {
        let mut text = format!("To: {}\r\n", self.to);
        if let Some(from) = &self.from {
            text.push_str(&format!("From: {from}\r\n"));
        }
        text.push_str(&format!("Subject: {}\r\n", self.subject));
        for header in &self.headers {
            text.push_str(header);
            text.push_str("\r\n");
        }
        text.push_str("\r\n");
        text.push_str(&self.body);
        text
    }
}

/// Delivers mail messages.
pub trait MailTransport: Send + Sync + fmt::Debug {
    /// Deliver `message`.
    fn send(&self, message: &MailMessage) -> Result<(), SinkError>;
}

/// Pipes messages to a local `sendmail -t -i`.
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: String,
}

impl SendmailTransport {
    /// Transport invoking `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SENDMAIL_PATH)
    }
}

impl MailTransport for SendmailTransport {
    fn send(&self, message: &MailMessage) -> Result<(), SinkError> {
        tracing::debug!(program = %self.program, to = %message.to, "delivering log mail");
        let mut child = Command::new(&self.program)
            .args(["-t", "-i"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| SinkError::io(self.program.clone(), error))?;

        // stdin is dropped before waiting so sendmail sees EOF; the child is
        // reaped even when the write fails.
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(message.to_rfc5322().as_bytes()));

        let output = child
            .wait_with_output()
            .map_err(|error| SinkError::io(self.program.clone(), error))?;
        written.map_err(|error| SinkError::io(self.program.clone(), error))?;
        if output.status.success() {
            return Ok(());
        }
        Err(SinkError::Transport {
            transport: "sendmail".to_string(),
            reason: format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })
    }
}

/// Mail sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// `To` address.
    pub to: String,
    /// Optional `From` address.
    pub from: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Extra raw header lines.
    pub headers: Vec<String>,
    /// Previous messages appended to each body; 0 disables history.
    pub history_size: usize,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            to: DEFAULT_MAIL_TO.to_string(),
            from: None,
            subject: DEFAULT_SUBJECT.to_string(),
            headers: Vec::new(),
            history_size: 0,
        }
    }
}

/// Sends each record as one mail message.
#[derive(Debug)]
pub struct MailSink {
    settings: MailSettings,
    transport: Arc<dyn MailTransport>,
    history: Mutex<VecDeque<String>>,
}

impl MailSink {
    /// Mail sink delivering through `transport`.
    #[must_use]
    pub fn new(settings: MailSettings, transport: Arc<dyn MailTransport>) -> Self {
        let capacity = settings.history_size;
        Self {
            settings,
            transport,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn body(&self, formatted: &str) -> String {
        let mut body = format!("{formatted}\n");
        if self.settings.history_size == 0 {
            return body;
        }

        let Ok(mut history) = self.history.lock() else {
            return body;
        };
        if !history.is_empty() {
            body.push('\n');
            body.push_str(HISTORY_HEADING);
            body.push('\n');
            for previous in history.iter() {
                body.push_str(previous);
                body.push('\n');
            }
        }
        if history.len() == self.settings.history_size {
            history.pop_front();
        }
        history.push_back(formatted.to_string());
        body
    }
}

impl Sink for MailSink {
    fn write(&self, _record: &LogRecord, formatted: &str) -> Result<(), SinkError> {
        let message = MailMessage {
            to: self.settings.to.clone(),
            from: self.settings.from.clone(),
            subject: self.settings.subject.clone(),
            headers: self.settings.headers.clone(),
            body: self.body(formatted),
        };
        self.transport.send(&message)
    }
}

/// Builds [`MailSink`]s.
///
/// Options: `mailTo` (one address or a list), `mailFrom`, `subject`, `headers` (list of raw header
/// lines), `historySize`, and `sendmailPath`.
#[derive(Debug, Default)]
pub struct MailSinkFactory {
    transport: Option<Arc<dyn MailTransport>>,
}

impl MailSinkFactory {
    /// Factory delivering through `transport` instead of sendmail.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }
}

impl SinkFactory for MailSinkFactory {
    fn sink_type(&self) -> &str {
        MAIL_SINK_TYPE
    }

    fn build(&self, section: &SinkSection) -> Result<Box<dyn Sink>, SinkError> {
        let options = &section.options;
        let headers = options.string_list("headers")?;
        let recipient_list = options.string_list("mailTo")?;
        let from = options.string("mailFrom")?;
        let subject = options.string_or("subject", DEFAULT_SUBJECT)?;
        single_line("headers", &headers)?;
        single_line("mailTo", &recipient_list)?;
        single_line("mailFrom", from.as_slice())?;
        single_line("subject", std::slice::from_ref(&subject))?;

        let settings = MailSettings {
            to: recipients(recipient_list),
            from,
            subject,
            headers,
            history_size: options.usize_or("historySize", 0)?,
        };

        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(SendmailTransport::new(
                options.string_or("sendmailPath", DEFAULT_SENDMAIL_PATH)?,
            )),
        };
        Ok(Box::new(MailSink::new(settings, transport)))
    }
}

/// Values written as header lines must not carry CR or LF, or they could add headers.
fn single_line(key: &str, values: &[String]) -> Result<(), SinkError> {
    if values.iter().any(|value| value.contains(['\r', '\n'])) {
        return Err(SinkError::invalid_option(key, "single-line header strings"));
    }
    Ok(())
}

fn recipients(addresses: Vec<String>) -> String {
    let addresses: Vec<String> = addresses
        .into_iter()
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty())
        .collect();
    if addresses.is_empty() {
        DEFAULT_MAIL_TO.to_string()
    } else {
        addresses.join(", ")
    }
}
