//! Conversion pipeline
//!
//! Wires the pieces together: a bounded ingestion queue fed by the decoder's
//! listener callbacks, a single worker task that owns the collector and the
//! field-description index (so neither needs locking), and the final document
//! assembly once the queue drains.

use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::enrich::enrich_laps;
use crate::error::ConvertError;
use crate::message::{FieldDescription, Message, MessageDefinition, MessageKind};
use crate::options::ConvertOptions;
use crate::translate::{translate, FieldDescriptionIndex, TranslatedMessage};

/// One decoder callback's payload. Definitions ride the same queue as
/// messages so arrival order survives the concurrency boundary.
#[derive(Debug)]
pub enum DecoderEvent {
    Definition(MessageDefinition),
    Message(Message),
}

/// Converts a stream of decoded messages into one JSON document.
///
/// Register the converter's two listener callbacks with the decoder, then
/// call [`wait`](Self::wait) after decoding finishes and read the document
/// from [`result`](Self::result):
///
/// ```no_run
/// # use fitconv::{ConvertOptions, JsonConverter, Message};
/// # async fn demo(messages: Vec<Message>) {
/// let mut conv = JsonConverter::new(ConvertOptions::default());
/// for mesg in messages {
///     conv.on_mesg(mesg).await;
/// }
/// conv.wait().await;
/// assert!(conv.err().is_none());
/// let json = conv.result();
/// # let _ = json;
/// # }
/// ```
pub struct JsonConverter {
    tx: Option<mpsc::Sender<DecoderEvent>>,
    done: Option<oneshot::Receiver<Result<String, ConvertError>>>,
    result: String,
    err: Option<ConvertError>,
}

impl JsonConverter {
    /// Spawn the translation worker and return the listener surface. Must be
    /// called within a tokio runtime.
    pub fn new(options: ConvertOptions) -> Self {
        let (tx, rx) = mpsc::channel(options.channel_buffer_size);
        let (done_tx, done_rx) = oneshot::channel();
        tokio::spawn(run_worker(rx, options, done_tx));
        Self {
            tx: Some(tx),
            done: Some(done_rx),
            result: String::new(),
            err: None,
        }
    }

    /// Message-definition listener callback.
    pub async fn on_mesg_def(&self, def: MessageDefinition) {
        self.send(DecoderEvent::Definition(def)).await;
    }

    /// Message listener callback.
    pub async fn on_mesg(&self, mesg: Message) {
        self.send(DecoderEvent::Message(mesg)).await;
    }

    async fn send(&self, event: DecoderEvent) {
        if let Some(tx) = &self.tx {
            // Suspends while the queue is full; this is the only
            // backpressure point in the pipeline.
            let _ = tx.send(event).await;
        }
    }

    /// Close the producer side and wait for the worker to drain the queue,
    /// enrich the laps, and assemble the document.
    pub async fn wait(&mut self) {
        self.tx.take();
        let Some(done) = self.done.take() else {
            return;
        };
        match done.await {
            Ok(Ok(json)) => self.result = json,
            Ok(Err(err)) => {
                error!(%err, "conversion failed");
                self.err = Some(err);
            }
            Err(_) => self.err = Some(ConvertError::WorkerGone),
        }
    }

    /// The error recorded during conversion, if any.
    pub fn err(&self) -> Option<&ConvertError> {
        self.err.as_ref()
    }

    /// The final JSON document. Empty until [`wait`](Self::wait) returns, and
    /// empty on error.
    pub fn result(&self) -> &str {
        &self.result
    }
}

/// Translated messages bucketed by category. Append-only until assembly.
#[derive(Debug, Default)]
struct Collector {
    sessions: Vec<TranslatedMessage>,
    laps: Vec<TranslatedMessage>,
    records: Vec<TranslatedMessage>,
    sports: Vec<TranslatedMessage>,
}

async fn run_worker(
    mut rx: mpsc::Receiver<DecoderEvent>,
    options: ConvertOptions,
    done_tx: oneshot::Sender<Result<String, ConvertError>>,
) {
    let mut index = FieldDescriptionIndex::default();
    let mut collector = Collector::default();

    while let Some(event) = rx.recv().await {
        match event {
            // Definitions carry nothing the JSON output needs.
            DecoderEvent::Definition(_) => {}
            DecoderEvent::Message(mesg) => collect(mesg, &mut index, &mut collector, &options),
        }
    }

    let _ = done_tx.send(assemble(collector, &options));
}

fn collect(
    mesg: Message,
    index: &mut FieldDescriptionIndex,
    collector: &mut Collector,
    options: &ConvertOptions,
) {
    if mesg.kind() == MessageKind::FieldDescription {
        match FieldDescription::from_message(&mesg) {
            Some(desc) => index.record(desc),
            None => debug!("field description message missing required fields"),
        }
        return;
    }

    let Some(translated) = translate(&mesg, index, options) else {
        return;
    };
    match mesg.kind() {
        MessageKind::Session => collector.sessions.push(translated),
        MessageKind::Lap => collector.laps.push(translated),
        MessageKind::Record => collector.records.push(translated),
        MessageKind::Sport => collector.sports.push(translated),
        // Other categories are not part of the output document.
        _ => {}
    }
}

fn assemble(
    mut collector: Collector,
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    enrich_laps(&mut collector.laps, &collector.records);

    info!(
        sessions = collector.sessions.len(),
        sports = collector.sports.len(),
        laps = collector.laps.len(),
        records = collector.records.len(),
        "assembling document"
    );

    let mut doc = serde_json::Map::new();

    // Only one session and one sport are expected; extras are dropped.
    if let Some(session) = collector.sessions.into_iter().next() {
        doc.insert("sessionSummary".to_string(), JsonValue::Object(session));
    }
    if let Some(sport) = collector.sports.into_iter().next() {
        doc.insert("sport".to_string(), JsonValue::Object(sport));
    }

    doc.insert(
        "laps".to_string(),
        JsonValue::Array(collector.laps.into_iter().map(JsonValue::Object).collect()),
    );

    if !options.no_records {
        doc.insert(
            "records".to_string(),
            JsonValue::Array(
                collector
                    .records
                    .into_iter()
                    .map(JsonValue::Object)
                    .collect(),
            ),
        );
    }

    let json = if options.pretty_print {
        serde_json::to_string_pretty(&doc)?
    } else {
        serde_json::to_string(&doc)?
    };
    Ok(json)
}
