use chrono::Utc;
use serde::Serialize;

use ciclo_core::confession::Confession;
use ciclo_core::goal::Goal;
use ciclo_core::identity::Identity;
use ciclo_core::progress::compute_level;
use ciclo_core::stats::UserStats;

// ─── Coach persona ────────────────────────────────────────────────────────

/// System instruction for the mentor. Short, direct, chat-register
/// coaching — no lecturing, no formatting.
pub const COACH_SYSTEM_INSTRUCTION: &str = "\
ERES: \"Rompe el Ciclo\", un mentor real, humano y directo. No eres un robot, ni un académico. \
Hablas como una persona normal que entiende el dolor porque lo ha visto mil veces.

TU OBJETIVO: Destrabar al usuario. No dar cátedra.

REGLAS DE ORO (A CUMPLIR O MUERES):
1. RESPUESTAS CORTAS: Máximo 2-3 oraciones por idea. Si escribes un párrafo largo, fallaste.
2. CERO TITULOS/FORMATO: No uses negritas excesivas, ni \"H1\", ni \"Capítulo X\". Escribe como si fuera un chat de Whatsapp serio.
3. LENGUAJE SIMPLE: Nada de \"ROI emocional\" o palabras raras. Usa \"costo\", \"dolor\", \"ganancia\". Habla claro.
4. EMPATÍA + VERDAD: Primero valida (\"Te entiendo, es jodido estar ahí\"), luego golpea con la verdad (\"Pero seguir llorando no lo arregla\").
5. ATAQUE AL DOLOR: Identifica qué le duele y úsalo para moverlo.

PROTOCOLO DE PRIVACIDAD:
Si preguntan por sus datos: \"Todo queda en tu teléfono. Yo no guardo nada, ni nadie más lo ve.\"";

/// At most this many recent confessions are summarized into the context.
const MAX_LOG_SUMMARIES: usize = 10;

// ─── Context construction ─────────────────────────────────────────────────

/// Metadata-only view of a confession. Media payloads never reach the
/// completion service — only the labels around them.
#[derive(Debug, Serialize)]
struct LogSummary<'a> {
    id: String,
    tipo: &'static str,
    fecha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocolo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nota_reflexion: Option<&'a str>,
}

/// Assemble the operator-context block sent ahead of the conversation.
pub fn build_context(
    identity: &Identity,
    confessions: &[Confession],
    goals: &[Goal],
    stats: &UserStats,
) -> String {
    let logs: Vec<LogSummary> = confessions
        .iter()
        .take(MAX_LOG_SUMMARIES)
        .map(|c| LogSummary {
            id: c.id.to_string(),
            tipo: c.kind.as_str(),
            fecha: &c.date,
            protocolo: c.session_name.as_deref(),
            nota_reflexion: c.note.as_deref(),
        })
        .collect();
    let logs_json = serde_json::to_string(&logs).unwrap_or_else(|_| "[]".into());

    let goals_summary = goals
        .iter()
        .map(|g| format!("{} ({}%)", g.goal_title, g.progress_percentage))
        .collect::<Vec<_>>()
        .join(", ");

    let stats_summary = format!(
        "Nivel {} | Racha: {} días",
        compute_level(stats.xp),
        stats.current_streak
    );

    format!(
        "[OPERADOR_ID]: {}\n\
         [NORTE_ESTRATEGICO]: {}\n\
         [OBJETIVOS_ACTUALES]: {}\n\
         [ESTADO_OPERATIVO]: {}\n\
         [REGISTROS_RECIENTES]: {}\n\
         [FECHA_SISTEMA]: {}",
        identity.name.as_deref().unwrap_or("Desconocido"),
        if identity.north_star.is_empty() {
            "Sin definir"
        } else {
            &identity.north_star
        },
        goals_summary,
        stats_summary,
        logs_json,
        Utc::now().format("%Y-%m-%d"),
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────
