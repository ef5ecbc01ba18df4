//! Token-metered generation handlers.
//!
//! Every handler runs the same pipeline: authenticate, compute the cost,
//! deduct from the balance, call the AI adapter, append a history entry,
//! and respond with the generated text plus the remaining balance.
//!
//! Two policies are deliberate and load-bearing:
//!
//! - **Insufficient balance** refuses the request with 402 before any
//!   provider call; the balance is untouched and no history is written.
//! - **Provider failure after deduction** refunds the cost and ships an
//!   apologetic reply inside a 200 response, so conversational UIs can show
//!   it inline. The user never pays for failed generation.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use aksara_core::cost;
use aksara_core::history::truncate_chars;
use aksara_core::{Feature, HistoryEntry};
use aksara_store::Store;

use crate::ai::{ChatMessage, CompletionRequest};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Shared system instruction for all generations.
const SYSTEM_PROMPT: &str = "Kamu adalah Aksara, asisten AI penulisan kreatif \
berbahasa Indonesia.\nJangan menyebut dirimu ChatGPT.";

/// Notice returned (without charging) when no AI provider is configured.
const AI_NOT_CONFIGURED_NOTICE: &str = "⚠️ Fitur AI belum aktif. Admin perlu mengisi \
kunci AI (GROQ_API_KEY atau GEMINI_API_KEY) terlebih dahulu.";

/// Placeholder for prompt fields the user left empty.
const BLANK: &str = "(tidak diisi)";

/// Generation response: the reply plus the remaining balance. The novel
/// suite additionally reports the charged cost.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Generated text, a configuration notice, or an apologetic failure
    /// reply.
    pub reply: String,
    /// Remaining balance, absent on the unconfigured-provider notice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<i64>,
    /// The charged cost, reported by the novel-suite endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
}

/// One metered generation, ready to run.
struct Generation {
    feature: Feature,
    title: String,
    cost: i64,
    completion: CompletionRequest,
    /// Whether the response reports the charged cost.
    include_cost: bool,
}

/// The shared metering pipeline.
async fn run_metered(
    state: &AppState,
    auth: &AuthUser,
    generation: Generation,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Some(ai) = &state.ai else {
        // No provider key configured: answer with a notice, charge nothing.
        return Ok(Json(GenerateResponse {
            reply: AI_NOT_CONFIGURED_NOTICE.to_string(),
            tokens: None,
            cost: None,
        }));
    };

    let outcome = state.store.deduct_tokens(&auth.user_id, generation.cost)?;
    if !outcome.ok {
        return Err(ApiError::InsufficientTokens {
            tokens: outcome.tokens,
        });
    }

    match ai.complete(&generation.completion).await {
        Ok(reply) => {
            let entry = HistoryEntry::new(
                auth.user_id,
                generation.feature,
                &generation.title,
                reply.clone(),
                generation.cost,
            );
            state.store.append_history(&entry)?;

            tracing::info!(
                user_id = %auth.user_id,
                feature = %generation.feature,
                cost = generation.cost,
                tokens_left = outcome.tokens,
                "Generation completed"
            );

            Ok(Json(GenerateResponse {
                reply,
                tokens: Some(outcome.tokens),
                cost: generation.include_cost.then_some(generation.cost),
            }))
        }
        Err(err) => {
            tracing::error!(
                user_id = %auth.user_id,
                feature = %generation.feature,
                error = %err,
                "Generation failed; refunding cost"
            );
            let restored = state.store.add_tokens(&auth.user_id, generation.cost)?;

            Ok(Json(GenerateResponse {
                reply: cost::failure_reply(generation.feature),
                tokens: Some(restored),
                cost: None,
            }))
        }
    }
}

fn or_blank(field: Option<&str>) -> &str {
    field.filter(|s| !s.trim().is_empty()).unwrap_or(BLANK)
}

// ============================================================================
// Chat
// ============================================================================

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default)]
    pub message: String,
}

/// One chat turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<ChatRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Pesan kosong".into()));
    }

    let completion = CompletionRequest::conversation(vec![ChatMessage::user(body.message.clone())])
        .with_system(SYSTEM_PROMPT);

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::Chat,
            title: truncate_chars(&body.message, 50),
            cost: cost::CHAT_COST,
            completion,
            include_cost: false,
        },
    )
    .await
}

// ============================================================================
// Cerpen (short story)
// ============================================================================

/// Short story request.
#[derive(Debug, Deserialize)]
pub struct CerpenRequest {
    /// Story title.
    #[serde(default)]
    pub judul: String,
    /// Theme.
    #[serde(default)]
    pub tema: String,
    /// Genre.
    #[serde(default)]
    pub genre: String,
    /// Target length in words.
    #[serde(default = "default_cerpen_words")]
    pub panjang: u32,
}

fn default_cerpen_words() -> u32 {
    500
}

/// Generate a short story.
pub async fn cerpen(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CerpenRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = format!(
        "Buat cerpen bahasa Indonesia.\n\
         Judul: {}\n\
         Tema: {}\n\
         Genre: {}\n\
         Panjang {} kata.",
        body.judul, body.tema, body.genre, body.panjang
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::Cerpen,
            title: body.judul.clone(),
            cost: cost::cerpen_cost(body.panjang),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: false,
        },
    )
    .await
}

// ============================================================================
// Skenario (screenplay)
// ============================================================================

/// Screenplay request.
#[derive(Debug, Deserialize)]
pub struct SkenarioRequest {
    /// Title.
    #[serde(default)]
    pub judul: String,
    /// Genre.
    #[serde(default)]
    pub genre: String,
    /// Story description; its word count drives the cost.
    #[serde(default)]
    pub deskripsi: String,
}

/// Generate a film screenplay.
pub async fn skenario(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<SkenarioRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = format!(
        "Buat skenario film berbahasa Indonesia.\n\n\
         Judul: {}\n\
         Genre: {}\n\
         Deskripsi:\n{}\n\n\
         Gunakan format:\nSCENE\nAKSI\nDIALOG",
        body.judul, body.genre, body.deskripsi
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::Skenario,
            title: body.judul.clone(),
            cost: cost::skenario_cost(cost::word_count(&body.deskripsi)),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: false,
        },
    )
    .await
}

// ============================================================================
// Rewrite / editorial critique
// ============================================================================

/// Rewrite request.
#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    /// The text to review; its word count drives the cost.
    #[serde(default)]
    pub teks: String,
    /// Review focus.
    #[serde(default = "default_fokus")]
    pub fokus: String,
    /// Critique style.
    #[serde(default = "default_gaya")]
    pub gaya: String,
}

fn default_fokus() -> String {
    "Keseluruhan tulisan".into()
}

fn default_gaya() -> String {
    "Konstruktif".into()
}

/// Review and rewrite a text.
pub async fn rewrite(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RewriteRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if body.teks.trim().is_empty() {
        return Err(ApiError::BadRequest("Masukkan teks untuk direview".into()));
    }

    let prompt = format!(
        "Anda adalah editor bahasa Indonesia. Fokus: {}. Gaya kritik: {}.\n\
         Berikan evaluasi ringkas, poin perbaikan, dan contoh perbaikan untuk teks berikut:\n\n{}",
        body.fokus, body.gaya, body.teks
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::Rewrite,
            title: truncate_chars(&body.teks, 50),
            cost: cost::rewrite_cost(cost::word_count(&body.teks)),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: false,
        },
    )
    .await
}

// ============================================================================
// Novel suite
// ============================================================================

/// Opening-chapter request. Accepts both current and legacy field spellings;
/// [`NovelCreateParams`] is the canonical shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelCreateRequest {
    /// Title.
    #[serde(default)]
    pub judul: String,
    /// Genre.
    #[serde(default)]
    pub genre: String,
    /// Theme.
    #[serde(default)]
    pub tema: String,
    /// Main character.
    #[serde(default)]
    pub tokoh_utama: Option<String>,
    /// Legacy spelling of `tokohUtama`.
    #[serde(default)]
    pub tokoh: Option<String>,
    /// Setting.
    #[serde(default)]
    pub setting: Option<String>,
    /// Opening conflict.
    #[serde(default)]
    pub konflik: Option<String>,
    /// Legacy spelling of `panjang`.
    #[serde(default)]
    pub panjang_bab: Option<u32>,
    /// Target chapter length in words.
    #[serde(default)]
    pub panjang: Option<u32>,
}

/// Canonical opening-chapter parameters after folding legacy spellings.
struct NovelCreateParams {
    judul: String,
    genre: String,
    tema: String,
    tokoh_utama: Option<String>,
    setting: Option<String>,
    konflik: Option<String>,
    target_words: u32,
}

impl From<NovelCreateRequest> for NovelCreateParams {
    fn from(wire: NovelCreateRequest) -> Self {
        Self {
            judul: wire.judul,
            genre: wire.genre,
            tema: wire.tema,
            tokoh_utama: wire.tokoh_utama.or(wire.tokoh),
            setting: wire.setting,
            konflik: wire.konflik,
            target_words: wire.panjang.or(wire.panjang_bab).unwrap_or(800),
        }
    }
}

/// Generate the opening chapter of a novel.
pub async fn novel_create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<NovelCreateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let params = NovelCreateParams::from(body);

    let prompt = format!(
        "Buat bab pembuka novel berbahasa Indonesia dengan detail:\n\
         Judul: {}\n\
         Genre: {}\n\
         Tema: {}\n\
         Tokoh Utama: {}\n\
         Setting: {}\n\
         Konflik Awal: {}\n\n\
         Tulis bab 1 sepanjang {} kata dengan narasi menarik, dialog natural, \
         dan deskripsi vivid.",
        params.judul,
        params.genre,
        params.tema,
        or_blank(params.tokoh_utama.as_deref()),
        or_blank(params.setting.as_deref()),
        or_blank(params.konflik.as_deref()),
        params.target_words
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::NovelCreate,
            title: params.judul.clone(),
            cost: cost::novel_create_cost(params.target_words),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: true,
        },
    )
    .await
}

/// Continuation request. Accepts both current and legacy field spellings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelContinueRequest {
    /// Story so far.
    #[serde(default)]
    pub konteks: Option<String>,
    /// Legacy spelling of `konteks`.
    #[serde(default)]
    pub context: Option<String>,
    /// Direction for the continuation.
    #[serde(default)]
    pub arah_cerita: Option<String>,
    /// Legacy spelling of `arahCerita`.
    #[serde(default)]
    pub arahan: Option<String>,
    /// Target continuation length in words.
    #[serde(default)]
    pub panjang: Option<u32>,
}

/// Canonical continuation parameters after folding legacy spellings.
struct NovelContinueParams {
    konteks: Option<String>,
    arah: String,
    target_words: u32,
}

impl From<NovelContinueRequest> for NovelContinueParams {
    fn from(wire: NovelContinueRequest) -> Self {
        Self {
            konteks: wire.konteks.or(wire.context),
            arah: wire
                .arah_cerita
                .or(wire.arahan)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "Lanjutkan sesuai konteks.".into()),
            target_words: wire.panjang.unwrap_or(600),
        }
    }
}

/// Continue an existing story.
pub async fn novel_continue(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<NovelContinueRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let params = NovelContinueParams::from(body);

    let prompt = format!(
        "Lanjutkan cerita berikut dengan {} kata:\n\n\
         Konteks sebelumnya:\n{}\n\n\
         Arah cerita selanjutnya: {}\n\n\
         Tulis kelanjutan yang koheren dan menarik.",
        params.target_words,
        or_blank(params.konteks.as_deref()),
        params.arah
    );

    let title = params
        .konteks
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map_or_else(|| "Lanjutan".to_string(), |ctx| truncate_chars(ctx, 50));

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::NovelContinue,
            title,
            cost: cost::novel_continue_cost(params.target_words),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: true,
        },
    )
    .await
}

/// Outline request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelOutlineRequest {
    /// Title.
    #[serde(default)]
    pub judul: String,
    /// Genre.
    #[serde(default)]
    pub genre: String,
    /// Theme.
    #[serde(default)]
    pub tema: String,
    /// Number of chapters to outline.
    #[serde(default = "default_outline_chapters")]
    pub jumlah_bab: u32,
}

fn default_outline_chapters() -> u32 {
    10
}

/// Generate a chapter outline.
pub async fn novel_outline(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<NovelOutlineRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = format!(
        "Buat outline novel berbahasa Indonesia:\n\
         Judul: {}\n\
         Genre: {}\n\
         Tema: {}\n\
         Jumlah Bab: {}\n\n\
         Buat struktur outline dengan:\n\
         - Ringkasan per bab\n\
         - Arc karakter utama\n\
         - Twist dan klimaks\n\
         - Resolusi",
        body.judul, body.genre, body.tema, body.jumlah_bab
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::NovelOutline,
            title: body.judul.clone(),
            cost: cost::novel_outline_cost(body.jumlah_bab),
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: true,
        },
    )
    .await
}

/// Character profile request.
#[derive(Debug, Deserialize)]
pub struct NovelCharacterRequest {
    /// Character name.
    #[serde(default)]
    pub nama: String,
    /// Role in the story.
    #[serde(default)]
    pub peran: String,
    /// Personality.
    #[serde(default)]
    pub kepribadian: String,
    /// Background.
    #[serde(default)]
    pub latar: String,
    /// Goals.
    #[serde(default)]
    pub tujuan: String,
}

/// Generate a character profile.
pub async fn novel_character(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<NovelCharacterRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = format!(
        "Kembangkan profil karakter mendalam untuk novel:\n\
         Nama: {}\n\
         Peran: {}\n\
         Kepribadian: {}\n\
         Latar Belakang: {}\n\
         Tujuan: {}\n\n\
         Buat profil lengkap dengan:\n\
         - Motivasi internal/eksternal\n\
         - Kekuatan & kelemahan\n\
         - Arc transformasi\n\
         - Hubungan dengan karakter lain\n\
         - Quirks unik",
        body.nama, body.peran, body.kepribadian, body.latar, body.tujuan
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::NovelCharacter,
            title: body.nama.clone(),
            cost: cost::NOVEL_CHARACTER_COST,
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: true,
        },
    )
    .await
}

/// Worldbuilding request. Accepts both current and legacy field spellings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelWorldRequest {
    /// World name.
    #[serde(default)]
    pub nama_world: Option<String>,
    /// Legacy spelling of `namaWorld`.
    #[serde(default)]
    pub nama: Option<String>,
    /// World type.
    #[serde(default)]
    pub tipe: Option<String>,
    /// Legacy spelling of `tipe`.
    #[serde(default)]
    pub setting: Option<String>,
    /// Unique elements.
    #[serde(default)]
    pub elemen: Option<String>,
    /// Legacy spelling of `elemen`.
    #[serde(default)]
    pub sistem: Option<String>,
    /// World rules/laws.
    #[serde(default)]
    pub aturan: Option<String>,
    /// Culture.
    #[serde(default)]
    pub budaya: Option<String>,
}

/// Canonical worldbuilding parameters after folding legacy spellings.
struct NovelWorldParams {
    nama: Option<String>,
    tipe: Option<String>,
    elemen: Option<String>,
    aturan: Option<String>,
    budaya: Option<String>,
}

impl From<NovelWorldRequest> for NovelWorldParams {
    fn from(wire: NovelWorldRequest) -> Self {
        Self {
            nama: wire.nama_world.or(wire.nama),
            tipe: wire.tipe.or(wire.setting),
            elemen: wire.elemen.or(wire.sistem),
            aturan: wire.aturan,
            budaya: wire.budaya,
        }
    }
}

/// Generate a worldbuilding document.
pub async fn novel_world(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<NovelWorldRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let params = NovelWorldParams::from(body);

    let prompt = format!(
        "Bangun dunia untuk novel:\n\
         Nama: {}\n\
         Tipe: {}\n\
         Elemen Unik: {}\n\
         Aturan/Hukum: {}\n\
         Budaya: {}\n\n\
         Buat worldbuilding lengkap dengan:\n\
         - Geografi & iklim\n\
         - Sistem sosial/politik\n\
         - Teknologi/magikal\n\
         - Sejarah penting\n\
         - Konflik inheren\n\
         - Detail sensorik (suara, bau, visual)",
        or_blank(params.nama.as_deref()),
        or_blank(params.tipe.as_deref()),
        or_blank(params.elemen.as_deref()),
        or_blank(params.aturan.as_deref()),
        or_blank(params.budaya.as_deref())
    );

    run_metered(
        &state,
        &auth,
        Generation {
            feature: Feature::NovelWorld,
            title: params.nama.clone().unwrap_or_default(),
            cost: cost::NOVEL_WORLD_COST,
            completion: CompletionRequest::prompt(prompt).with_system(SYSTEM_PROMPT),
            include_cost: true,
        },
    )
    .await
}
