use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Span field naming the pipeline step, shown in its own column
const STEP_FIELD: &str = "step";

#[derive(Debug, Clone, Default)]
pub struct CustomSpanFields {
    pub raw_fields: HashMap<String, String>,
}

#[derive(Default)]
struct SpanFieldCollector {
    fields: CustomSpanFields,
}

impl Visit for SpanFieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();
        self.fields.raw_fields.insert(field.name().to_string(), formatted_value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.raw_fields.insert(field.name().to_string(), value.to_string());
    }
}

/// Keeps the fields of every span in its extensions so the formatters can print them.
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, id: &tracing::span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut collector = SpanFieldCollector::default();
        attrs.record(&mut collector);
        span.extensions_mut().insert(collector.fields);
    }

    fn on_record(&self, id: &tracing::span::Id, values: &tracing::span::Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        let fields = extensions.remove::<CustomSpanFields>().unwrap_or_default();

        let mut collector = SpanFieldCollector { fields };
        values.record(&mut collector);
        extensions.insert(collector.fields);
    }
}

/// Fields of the innermost span carrying a step, then of the spans around it, innermost first.
fn span_fields<S, N>(ctx: &FmtContext<'_, S, N>) -> (Option<String>, Vec<(String, String)>)
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let mut step = None;
    let mut fields = Vec::new();
    if let Some(scope) = ctx.event_scope() {
        for span in scope {
            let extensions = span.extensions();
            let Some(custom_fields) = extensions.get::<CustomSpanFields>() else { continue };
            for (key, value) in &custom_fields.raw_fields {
                if key == STEP_FIELD {
                    step.get_or_insert_with(|| value.clone());
                } else if !fields.iter().any(|(existing, _)| existing == key) {
                    fields.push((key.clone(), value.clone()));
                }
            }
        }
    }
    fields.sort();
    (step, fields)
}

// Readable single line format: [timestamp] [LEVEL] (service) [step] message (fields)
pub struct PrettyFormatter;

impl<S, N> FormatEvent<S, N> for PrettyFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let level_color = match *meta.level() {
            Level::TRACE => "\x1b[90m",
            Level::DEBUG => "\x1b[34m",
            Level::INFO => "\x1b[32m",
            Level::WARN => "\x1b[33m",
            Level::ERROR => "\x1b[31m",
        };
        let step_color = "\x1b[92m";
        let dim_color = "\x1b[90m";
        let reset = "\x1b[0m";

        let mut visitor = FieldExtractor::default();
        event.record(&mut visitor);
        let (step, span_fields) = span_fields(ctx);

        write!(writer, "{dim_color}[{now}]{reset} ")?;
        write!(writer, "{level_color}[{}]{reset} ", meta.level())?;
        write!(writer, "{dim_color}({}){reset} ", extract_service_name(meta.target()))?;
        if let Some(step) = step {
            write!(writer, "{step_color}[{step}]{reset} ")?;
        }
        write!(writer, "{}", visitor.message)?;

        let mut fields = visitor.fields;
        fields.extend(span_fields.into_iter().map(|(key, value)| format!("{key}={value}")));
        if !fields.is_empty() {
            write!(writer, " {dim_color}({}){reset}", fields.join(", "))?;
        }

        writeln!(writer)
    }
}

#[derive(Default)]
struct FieldExtractor {
    message: String,
    fields: Vec<String>,
}

impl Visit for FieldExtractor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let formatted_value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = formatted_value;
        } else {
            self.fields.push(format!("{}={}", field.name(), formatted_value));
        }
    }
}

// JSON formatter, one object per line
pub struct JsonEventFormatter;

#[derive(Default)]
struct JsonFieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for JsonFieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let v = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = Some(v);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(v));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let ts = Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);

        let mut root = Map::new();
        root.insert("timestamp".to_string(), Value::String(ts));
        root.insert("level".to_string(), Value::String(meta.level().to_string()));
        root.insert("target".to_string(), Value::String(meta.target().to_string()));
        root.insert("service".to_string(), Value::String(extract_service_name(meta.target()).to_string()));
        if let Some(message) = visitor.message.take() {
            root.insert("message".to_string(), Value::String(message));
        }

        let mut all_fields = visitor.fields;
        let (step, span_fields) = span_fields(ctx);
        if let Some(step) = step {
            root.insert(STEP_FIELD.to_string(), Value::String(step));
        }
        for (key, value) in span_fields {
            all_fields.entry(key).or_insert(Value::String(value));
        }
        if !all_fields.is_empty() {
            root.insert("fields".to_string(), Value::Object(all_fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Default filter when `RUST_LOG` is not set
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    ["pod_publishing", "pod_publishing_nevermined_client", "pod_publishing_registry_client_interface"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with
/// - PrettyFormatter for console readability (when LOG_FORMAT != "json")
/// - JsonEventFormatter for json logging (when LOG_FORMAT = "json")
///
/// This will also install color_eyre to handle panics in the application
pub fn init_logging(verbose: bool) -> color_eyre::Result<()> {
    color_eyre::install()?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::builder().with_default_directive(Level::WARN.into()).parse(default_directives(verbose))?,
    };

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let fmt_layer = if log_format == "json" {
        fmt::layer().with_target(true).event_format(JsonEventFormatter).boxed()
    } else {
        fmt::layer().with_target(true).event_format(PrettyFormatter).boxed()
    };

    let subscriber =
        Registry::default().with(env_filter).with(FieldCollectorLayer).with(fmt_layer).with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Short display name of the crate emitting an event
fn extract_service_name(target: &str) -> &'static str {
    if target.starts_with("pod_publishing_nevermined_client") {
        "NEVERMINED"
    } else if target.starts_with("pod_publishing_registry_client_interface") {
        "REGISTRY"
    } else if target.starts_with("pod_publishing") {
        "-"
    } else {
        "EXTERNAL"
    }
}
