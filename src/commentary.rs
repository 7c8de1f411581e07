//! AI commentary for run milestones and game over.
//!
//! Short Thai-language taunts fetched from the Gemini API and written into
//! the `#commentary-bubble` DOM element. Everything here is fire-and-forget:
//! a missing API key, a failed request, or a reply that lands after the run
//! has restarted must never touch gameplay, so the simulation never waits on
//! this module.

use std::cell::Cell;
use std::rc::Rc;

use crate::consts::COMMENTARY_COOLDOWN_MS;
use crate::sim::{GameState, MilestoneKind};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::{JsFuture, spawn_local};
#[cfg(target_arch = "wasm32")]
use web_sys::{Request, RequestInit, RequestMode, Response};

const MODEL: &str = "gemini-2.5-flash-lite";

const END_SYSTEM: &str =
    "คุณคือ Dino-Tech AI ผู้ช่วยสุดกวน หน้าที่คือคอมเมนต์สั้นๆ กระชับ และกวนประสาท";
const MID_SYSTEM: &str = "คุณคือ Dino-Tech AI แซวสั้นๆ กระชับ ห้ามยาวเด็ดขาด";

const END_EMPTY_FALLBACK: &str = "สภาพ... ลองใหม่นะ";
const END_ERROR_FALLBACK: &str = "เอาน่า... อีกรอบเพื่อความปัง";
const MID_EMPTY_FALLBACK: &str = "วิ่งไป!";
const MID_ERROR_FALLBACK: &str = "ตึงจัด!";

const END_TEMPERATURE: f64 = 0.9;
const MID_TEMPERATURE: f64 = 0.7;

/// Where the run stood when the request was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Playing,
    Loss,
}

/// Snapshot of the numbers a prompt may quote. Copied out of [`GameState`]
/// at call time so the async fetch never borrows live state.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub score: u32,
    pub coins: u32,
    pub high_score: u32,
    pub speed: f32,
    pub status: RunStatus,
    pub event: Option<MilestoneKind>,
}

impl GameContext {
    fn from_state(
        state: &GameState,
        high_score: u32,
        status: RunStatus,
        event: Option<MilestoneKind>,
    ) -> Self {
        Self {
            score: state.score as u32,
            coins: state.coins,
            high_score,
            speed: state.speed,
            status,
            event,
        }
    }
}

/// Prompt for the game-over taunt. `high_score` is the best *before* this
/// run was recorded, so beating it reads as a new record.
pub fn end_of_run_prompt(ctx: &GameContext) -> String {
    let new_record = if ctx.score > ctx.high_score { "ใช่" } else { "ไม่" };
    format!(
        "ข้อมูลการเล่นล่าสุด (จบเกม):\n\
         - คะแนน: {}\n\
         - สถิติสูงสุด: {}\n\
         - เหรียญ: {}\n\
         - ความเร็ว: {:.1}\n\
         - ทำลายสถิติ: {}\n\n\
         หน้าที่ของคุณ:\n\
         เขียนคำแซวสั้นๆ (ไม่เกิน 12 คำ) ด้วยภาษาไทยวัยรุ่น กวนประสาท ประชดประชัน",
        ctx.score, ctx.high_score, ctx.coins, ctx.speed, new_record
    )
}

/// Prompt for a mid-run milestone quip.
pub fn milestone_prompt(ctx: &GameContext) -> String {
    let situation = match ctx.event {
        Some(MilestoneKind::Coins) => format!("รวยจัด มี {} เหรียญ", ctx.coins),
        _ => format!("วิ่งมา {} เมตรแล้ว", ctx.score),
    };
    format!(
        "สถานการณ์: {situation}\n\
         เขียนคำพูดสั้นๆ (ห้ามเกิน 8 คำ) แซวผู้เล่นแบบกวนๆ ภาษาไทยวัยรุ่น"
    )
}

/// Issues commentary requests and shows the replies.
///
/// Two rules keep this honest: at most one request is in flight and at least
/// [`COMMENTARY_COOLDOWN_MS`] passes between requests, and a reply is dropped
/// if the run restarted or ended while it was pending. The generation counter
/// enforces the second rule; it bumps on both transitions.
pub struct Commentator {
    last_call_ms: f64,
    in_flight: Rc<Cell<bool>>,
    generation: Rc<Cell<u32>>,
}

impl Default for Commentator {
    fn default() -> Self {
        Self::new()
    }
}

impl Commentator {
    pub fn new() -> Self {
        Self {
            last_call_ms: f64::NEG_INFINITY,
            in_flight: Rc::new(Cell::new(false)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// A fresh run invalidates any pending reply and clears the bubble.
    pub fn on_run_started(&mut self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        #[cfg(target_arch = "wasm32")]
        hide_bubble();
    }

    /// Game over. `previous_best` is the high score before this run was
    /// folded in; pending mid-run replies become stale here too.
    pub fn run_ended(&mut self, state: &GameState, previous_best: u32, now_ms: f64) {
        self.generation.set(self.generation.get().wrapping_add(1));
        let ctx = GameContext::from_state(state, previous_best, RunStatus::Loss, None);
        self.request(
            end_of_run_prompt(&ctx),
            END_SYSTEM,
            END_TEMPERATURE,
            END_EMPTY_FALLBACK,
            END_ERROR_FALLBACK,
            now_ms,
        );
    }

    /// Mid-run milestone crossed.
    pub fn milestone(&mut self, state: &GameState, best: u32, kind: MilestoneKind, now_ms: f64) {
        let ctx = GameContext::from_state(state, best, RunStatus::Playing, Some(kind));
        self.request(
            milestone_prompt(&ctx),
            MID_SYSTEM,
            MID_TEMPERATURE,
            MID_EMPTY_FALLBACK,
            MID_ERROR_FALLBACK,
            now_ms,
        );
    }

    /// Rate-limited entry point. Returns whether a request was issued.
    fn request(
        &mut self,
        prompt: String,
        system: &'static str,
        temperature: f64,
        empty_fallback: &'static str,
        error_fallback: &'static str,
        now_ms: f64,
    ) -> bool {
        if self.in_flight.get() || now_ms - self.last_call_ms < COMMENTARY_COOLDOWN_MS {
            return false;
        }
        self.last_call_ms = now_ms;
        self.in_flight.set(true);
        self.issue(prompt, system, temperature, empty_fallback, error_fallback);
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn issue(
        &self,
        prompt: String,
        system: &'static str,
        temperature: f64,
        empty_fallback: &'static str,
        error_fallback: &'static str,
    ) {
        let in_flight = Rc::clone(&self.in_flight);
        let generation = Rc::clone(&self.generation);
        let issued_at = generation.get();
        spawn_local(async move {
            let text = match fetch_commentary(&prompt, system, temperature).await {
                Ok(reply) if reply.is_empty() => empty_fallback.to_string(),
                Ok(reply) => reply,
                Err(err) => {
                    log::warn!("Commentary request failed: {err:?}");
                    error_fallback.to_string()
                }
            };
            in_flight.set(false);
            // The run may have restarted or ended while we were waiting
            if generation.get() == issued_at {
                show_bubble(&text);
            }
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn issue(
        &self,
        prompt: String,
        _system: &'static str,
        _temperature: f64,
        _empty_fallback: &'static str,
        _error_fallback: &'static str,
    ) {
        log::debug!("Commentary suppressed off-web:\n{prompt}");
        self.in_flight.set(false);
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_commentary(prompt: &str, system: &str, temperature: f64) -> Result<String, JsValue> {
    let Some(key) = option_env!("GEMINI_API_KEY") else {
        return Err(JsValue::from_str("GEMINI_API_KEY not set at build time"));
    };

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:generateContent?key={key}"
    );
    let body = serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "systemInstruction": { "parts": [{ "text": system }] },
        "generationConfig": { "temperature": temperature },
    });

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body.to_string()));

    let request = Request::new_with_str_and_init(&url, &opts)?;
    request.headers().set("Content-Type", "application/json")?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }

    let raw = JsFuture::from(response.text()?).await?;
    let raw = raw.as_string().unwrap_or_default();
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let reply = value["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok(reply)
}

#[cfg(target_arch = "wasm32")]
fn show_bubble(text: &str) {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("commentary-bubble"))
    {
        el.set_text_content(Some(text));
        let _ = el.set_attribute("class", "");
    }
}

#[cfg(target_arch = "wasm32")]
fn hide_bubble() {
    if let Some(el) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("commentary-bubble"))
    {
        el.set_text_content(None);
        let _ = el.set_attribute("class", "hidden");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(score: u32, coins: u32, high_score: u32) -> GameContext {
        GameContext {
            score,
            coins,
            high_score,
            speed: 9.5,
            status: RunStatus::Loss,
            event: None,
        }
    }

    #[test]
    fn test_end_prompt_flags_new_record() {
        let beaten = end_of_run_prompt(&context(1200, 4, 900));
        assert!(beaten.contains("ทำลายสถิติ: ใช่"));

        let short = end_of_run_prompt(&context(500, 4, 900));
        assert!(short.contains("ทำลายสถิติ: ไม่"));

        // Matching the record exactly is not a new record
        let tied = end_of_run_prompt(&context(900, 4, 900));
        assert!(tied.contains("ทำลายสถิติ: ไม่"));
    }

    #[test]
    fn test_end_prompt_quotes_stats() {
        let prompt = end_of_run_prompt(&context(1234, 7, 2000));
        assert!(prompt.contains("คะแนน: 1234"));
        assert!(prompt.contains("เหรียญ: 7"));
        assert!(prompt.contains("ความเร็ว: 9.5"));
    }

    #[test]
    fn test_milestone_prompt_matches_kind() {
        let mut ctx = context(2000, 15, 0);
        ctx.status = RunStatus::Playing;

        ctx.event = Some(MilestoneKind::Coins);
        assert!(milestone_prompt(&ctx).contains("มี 15 เหรียญ"));

        ctx.event = Some(MilestoneKind::Distance);
        assert!(milestone_prompt(&ctx).contains("วิ่งมา 2000 เมตรแล้ว"));
    }

    #[test]
    fn test_rate_limiter_spaces_out_requests() {
        let mut commentator = Commentator::new();
        let fire = |c: &mut Commentator, now: f64| {
            c.request("x".into(), MID_SYSTEM, 0.7, MID_EMPTY_FALLBACK, MID_ERROR_FALLBACK, now)
        };

        // First request goes out no matter how early the clock is
        assert!(fire(&mut commentator, 0.0));
        // Inside the cooldown window everything is dropped
        assert!(!fire(&mut commentator, 1.0));
        assert!(!fire(&mut commentator, COMMENTARY_COOLDOWN_MS - 1.0));
        // After the cooldown the next request goes out
        assert!(fire(&mut commentator, COMMENTARY_COOLDOWN_MS + 1.0));
    }

    #[test]
    fn test_generation_bumps_on_start_and_end() {
        let mut commentator = Commentator::new();
        let g0 = commentator.generation.get();
        commentator.on_run_started();
        let g1 = commentator.generation.get();
        assert_ne!(g0, g1);

        let state = GameState::new(7);
        commentator.run_ended(&state, 0, 0.0);
        assert_ne!(g1, commentator.generation.get());
    }
}
