//! IPC message dispatch: parse s-expressions and route to handlers.

use anyhow::{bail, Context};
use lexpr::Value;
use tracing::{debug, warn};

use crate::gesture::geometry::to_px;
use crate::gesture::{
    EventPayload, FrameResult, GestureConfig, GestureEvent, Hand, HandObservation, Handedness,
};
use crate::state::EngineState;

/// A decoded `:frame` message.
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp_s: f64,
    pub hands: Vec<HandObservation>,
}

/// Parse an s-expression message and dispatch to the appropriate handler.
/// Returns the output lines: event lines first (frames only), then exactly
/// one response.
pub fn handle_message(state: &mut EngineState, raw: &str) -> Vec<String> {
    let value = match lexpr::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            return vec![reject(state, 0, &format!("malformed s-expression: {e}"))];
        }
    };

    let msg_type = get_keyword(&value, "type");
    let msg_id = get_int(&value, "id").unwrap_or(0);
    debug!(msg_id, "message {:?}", msg_type);

    match msg_type.as_deref() {
        Some("frame") => handle_frame(state, msg_id, &value),
        Some("gesture-status") => vec![handle_gesture_status(state, msg_id)],
        Some("gesture-config") => vec![handle_gesture_config(state, msg_id, &value)],
        Some("gesture-reset") => vec![handle_gesture_reset(state, msg_id)],
        Some("ping") => vec![handle_ping(msg_id, &value)],
        Some(other) => vec![reject(
            state,
            msg_id,
            &format!("unknown message type: {other}"),
        )],
        None => vec![reject(state, msg_id, "missing :type field")],
    }
}

// ── Handlers ────────────────────────────────────────────────

fn handle_frame(state: &mut EngineState, msg_id: i64, value: &Value) -> Vec<String> {
    let frame = match parse_frame(value) {
        Ok(f) => f,
        Err(e) => return vec![reject(state, msg_id, &format!("{e:#}"))],
    };

    let result = state.detector.process(&frame.hands, frame.timestamp_s);
    state.frames_in += 1;

    let mut lines: Vec<String> = result.events.iter().map(event_sexp).collect();
    lines.push(format!(
        "(:type :response :id {} :status :ok :timestamp {:.3} :total {} :labels {})",
        msg_id,
        result.timestamp_s,
        result.total,
        labels_sexp(state, &result),
    ));
    state.last_frame = Some(result);
    lines
}

fn handle_gesture_status(state: &mut EngineState, msg_id: i64) -> String {
    format!(
        "(:type :response :id {} :status :ok :gesture {} :frames-in {} :errors {})",
        msg_id,
        state.detector.status_sexp(),
        state.frames_in,
        state.errors,
    )
}

fn handle_gesture_config(state: &mut EngineState, msg_id: i64, value: &Value) -> String {
    match apply_config(state.detector.config().clone(), value) {
        Ok(config) => {
            state.detector.set_config(config);
            debug!("gesture config updated: {}", state.detector.config_sexp());
            format!(
                "(:type :response :id {} :status :ok :config {})",
                msg_id,
                state.detector.config_sexp()
            )
        }
        Err(e) => reject(state, msg_id, &format!("{e:#}")),
    }
}

fn handle_gesture_reset(state: &mut EngineState, msg_id: i64) -> String {
    state.reset();
    ok_response(msg_id)
}

fn handle_ping(msg_id: i64, value: &Value) -> String {
    let client_ts = get_int(value, "timestamp").unwrap_or(0);
    format!(
        "(:type :response :id {} :status :ok :client-timestamp {})",
        msg_id, client_ts
    )
}

/// Apply any config keys present in the message.  Either every key is
/// valid and the whole update applies, or nothing changes.
fn apply_config(mut config: GestureConfig, value: &Value) -> anyhow::Result<GestureConfig> {
    if let Some(hold) = config_float(value, "hold-s")? {
        if hold < 0.0 {
            bail!(":hold-s must be non-negative, got {hold}");
        }
        config.display_hold_s = hold;
    }
    if let Some(amp) = config_float(value, "amplitude-threshold")? {
        if amp <= 0.0 {
            bail!(":amplitude-threshold must be positive, got {amp}");
        }
        config.wave.amplitude_threshold = amp as f32;
    }
    if let Some(crossings) = get_int(value, "crossing-threshold") {
        config.wave.crossing_threshold = u32::try_from(crossings)
            .with_context(|| format!(":crossing-threshold out of range: {crossings}"))?;
    }
    if let Some(ratio) = config_float(value, "open-ratio")? {
        if !(0.0..=1.0).contains(&ratio) {
            bail!(":open-ratio must be within 0..1, got {ratio}");
        }
        config.wave.open_ratio = ratio as f32;
    }
    if let Some(cooldown) = config_float(value, "cooldown-s")? {
        if cooldown < 0.0 {
            bail!(":cooldown-s must be non-negative, got {cooldown}");
        }
        config.wave.cooldown_s = cooldown;
    }
    if let Some(k) = config_float(value, "smoothing")? {
        if !(k > 0.0 && k <= 1.0) {
            bail!(":smoothing must be within (0, 1], got {k}");
        }
        config.wave.smoothing = k as f32;
    }
    if let Some(window) = get_int(value, "window") {
        if window < 1 {
            bail!(":window must be at least 1, got {window}");
        }
        config.wave.window =
            usize::try_from(window).with_context(|| format!(":window out of range: {window}"))?;
    }
    if let Some(margin) = config_float(value, "finger-margin")? {
        if margin < 0.0 {
            bail!(":finger-margin must be non-negative, got {margin}");
        }
        config.fingers.finger_margin = margin as f32;
    }
    if let Some(margin) = config_float(value, "thumb-margin")? {
        if margin < 0.0 {
            bail!(":thumb-margin must be non-negative, got {margin}");
        }
        config.fingers.thumb_margin = margin as f32;
    }
    if let Some(n) = get_int(value, "open-min-fingers") {
        if !(0..=5).contains(&n) {
            bail!(":open-min-fingers must be within 0..5, got {n}");
        }
        config.open_min_fingers = n as u8;
    }
    Ok(config)
}

/// A float config key.  Absent is `None`; present but not a finite
/// number is an error (`nan` and `inf` parse as floats otherwise).
fn config_float(value: &Value, key: &str) -> anyhow::Result<Option<f64>> {
    let Some(raw) = get_keyword(value, key) else {
        return Ok(None);
    };
    let v: f64 = raw
        .parse()
        .with_context(|| format!(":{key} is not a number: {raw}"))?;
    if !v.is_finite() {
        bail!(":{key} must be finite, got {raw}");
    }
    Ok(Some(v))
}

// ── Frame decoding ─────────────────────────────────────────

/// Decode a `:frame` message.  `:hands` may be absent or empty.
pub fn parse_frame(value: &Value) -> anyhow::Result<Frame> {
    let timestamp_s = get_float(value, "timestamp").context("frame missing numeric :timestamp")?;
    if !timestamp_s.is_finite() {
        bail!("frame :timestamp is not finite: {timestamp_s}");
    }

    let hands = match get_value(value, "hands") {
        Some(list) => list_items(list)
            .context(":hands is not a list")?
            .into_iter()
            .enumerate()
            .map(|(i, h)| parse_hand(h).with_context(|| format!("hand {i}")))
            .collect::<anyhow::Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(Frame { timestamp_s, hands })
}

/// Decode one hand plist: `(:handedness :left :score 0.9 :landmarks ((x y) ...))`.
/// Missing handedness reads as unknown, missing score as 1.0.  Points may
/// carry extra coordinates (z), which are ignored.
pub fn parse_hand(value: &Value) -> anyhow::Result<HandObservation> {
    if !matches!(value, Value::Cons(_)) {
        bail!("hand is not a plist: {value}");
    }

    let handedness = get_keyword(value, "handedness")
        .map(|s| Handedness::parse(&s))
        .unwrap_or(Handedness::Unknown);

    let score = match get_keyword(value, "score") {
        Some(s) => s
            .parse::<f32>()
            .with_context(|| format!(":score is not a number: {s}"))?,
        None => 1.0,
    };
    if !score.is_finite() {
        bail!(":score is not finite: {score}");
    }

    let points = get_value(value, "landmarks").context("hand missing :landmarks")?;
    let landmarks = list_items(points)
        .context(":landmarks is not a list")?
        .into_iter()
        .enumerate()
        .map(|(i, p)| parse_point(p).with_context(|| format!("landmark {i}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(HandObservation::new(landmarks, handedness, score))
}

fn parse_point(value: &Value) -> anyhow::Result<[f32; 2]> {
    let items = list_items(value).context("point is not a list")?;
    if items.len() < 2 {
        bail!("point needs x and y, got {} values", items.len());
    }
    let x = number(items[0]).context("x is not a number")?;
    let y = number(items[1]).context("y is not a number")?;
    Ok([x as f32, y as f32])
}

// ── Output formatting ──────────────────────────────────────

/// Render one gesture event as an IPC event line.
pub fn event_sexp(event: &GestureEvent) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("hand", format!(":{}", event.hand.as_str())),
        ("confidence", format!("{:.3}", event.confidence)),
        ("timestamp", format!("{:.3}", event.timestamp_s)),
    ];
    match event.payload {
        EventPayload::None => {}
        EventPayload::Fingers { count } => fields.push(("count", count.to_string())),
        EventPayload::Style(style) => {
            fields.push(("style", format!("\"{}\"", escape_string(style))))
        }
        EventPayload::Wave(stats) => {
            fields.push(("amplitude", format!("{:.3}", stats.amplitude)));
            fields.push(("crossings", stats.crossings.to_string()));
            fields.push(("open-ratio", format!("{:.3}", stats.open_ratio)));
        }
        EventPayload::Count { left, right, total } => {
            fields.push(("left", left.to_string()));
            fields.push(("right", right.to_string()));
            fields.push(("total", total.to_string()));
        }
    }
    let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    format_event(event.kind.as_str(), &fields)
}

/// Per-hand display labels for a frame, with pixel anchors when the frame
/// size is known and the hand was observed.
fn labels_sexp(state: &EngineState, frame: &FrameResult) -> String {
    let mut s = String::from("(");
    for hand in Hand::BOTH {
        let label = match state.detector.display_label(frame, hand, frame.timestamp_s) {
            Some(l) => l,
            None => continue,
        };
        if s.len() > 1 {
            s.push(' ');
        }
        s.push_str(&format!(
            "(:hand :{} :label \"{}\"",
            hand.as_str(),
            escape_string(&label)
        ));
        if let (Some((w, h)), Some(result)) = (state.frame_size, frame.per_hand.get(&hand)) {
            let (px, py) = to_px(result.center, w, h);
            s.push_str(&format!(" :anchor ({} {})", px, py));
        }
        s.push(')');
    }
    s.push(')');
    s
}

// ── Helpers ────────────────────────────────────────────────

fn reject(state: &mut EngineState, id: i64, reason: &str) -> String {
    warn!(id, "rejected message: {}", reason);
    state.errors += 1;
    error_response(id, reason)
}

fn ok_response(id: i64) -> String {
    format!("(:type :response :id {} :status :ok)", id)
}

fn error_response(id: i64, reason: &str) -> String {
    format!(
        "(:type :response :id {} :status :error :reason \"{}\")",
        id,
        escape_string(reason)
    )
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Find the value following `:key` in an s-expression plist.
/// Handles both `Value::Keyword("key")` (elisp parser) and
/// `Value::Symbol(":key")` (default parser) forms.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a keyword value from an s-expression plist as text.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    get_value(value, key).map(|val| match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "t".to_string(),
        Value::Bool(false) => "nil".to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        other => other.to_string(),
    })
}

/// Extract an integer value from an s-expression plist.
fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a floating-point value from an s-expression plist.
fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Elements of a proper list or vector.  `()` and `nil` are empty; any
/// other atom, or an improper list, is not a list.
fn list_items(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Null | Value::Nil => Some(Vec::new()),
        Value::Symbol(s) if s.as_ref() == "nil" => Some(Vec::new()),
        Value::Vector(items) => Some(items.iter().collect()),
        Value::Cons(_) => {
            let mut items = Vec::new();
            let mut current = value;
            loop {
                match current {
                    Value::Cons(pair) => {
                        items.push(pair.car());
                        current = pair.cdr();
                    }
                    Value::Null | Value::Nil => return Some(items),
                    _ => return None,
                }
            }
        }
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Format an IPC event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}
