use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pilar
// ---------------------------------------------------------------------------

/// One lesson unit of the curriculum. Pilares form a strictly linear
/// chain: pilar 0 is never locked, pilar N unlocks once pilar N-1 is
/// completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilar {
    pub id: u32,
    pub titulo: String,
    pub subtitulo: String,
    pub concepto: String,
    pub accion: String,
    pub ejercicio: String,
    #[serde(default)]
    pub completado: bool,
    #[serde(default)]
    pub bloqueado: bool,
}

impl Pilar {
    /// The seven canonical pilares seeded at session reset. Only pilar 0
    /// starts unlocked; the backend may override this set with a dynamic
    /// list (see [`merge`]).
    pub fn seed() -> Vec<Pilar> {
        fn p(
            id: u32,
            titulo: &str,
            subtitulo: &str,
            concepto: &str,
            accion: &str,
            ejercicio: &str,
        ) -> Pilar {
            Pilar {
                id,
                titulo: titulo.into(),
                subtitulo: subtitulo.into(),
                concepto: concepto.into(),
                accion: accion.into(),
                ejercicio: ejercicio.into(),
                completado: false,
                bloqueado: id != 0,
            }
        }

        vec![
            p(
                0,
                "EL DESPERTAR",
                "Protocolo de Consciencia",
                "Tu vida es una repetición. Romper el ciclo requiere dolor.",
                "Análisis de Patrones",
                "El Muro de la Verdad",
            ),
            p(
                1,
                "TRAMPA MENTAL",
                "Procrastinación Culta",
                "Estudiar es un escondite. La teoría sin práctica es veneno.",
                "Dieta de Información",
                "Confesión del Espejo",
            ),
            p(
                2,
                "VERDAD DEL MIEDO",
                "Riesgo Emocional",
                "Decidir con miedo es la única forma de crecer.",
                "Regla 30 días.",
                "Botón del Pánico Inverso",
            ),
            p(
                3,
                "VENDER ES AMAR",
                "Tu Valor Real",
                "No vender es egoísmo puro.",
                "Lanzamiento Flash.",
                "Generador de Oferta Flash",
            ),
            p(
                4,
                "MOTOR DE ACCIÓN",
                "Sistemas sobre Emociones",
                "El impulso vence a la motivación.",
                "Acción Mínima Diaria.",
                "Streak Tracker",
            ),
            p(
                5,
                "CÍRCULO DE FUEGO",
                "Gestión del Entorno",
                "Tu fuerza de voluntad no puede contra tu entorno.",
                "Auditoría Social",
                "Lista de Despido",
            ),
            p(
                6,
                "EL FRACASO ES DATO",
                "Resiliencia Kaizen",
                "Quítale la emoción al error. Solo es información.",
                "Re-encuadre Táctico",
                "Post-Mortem de Éxito",
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// Remote rows
// ---------------------------------------------------------------------------

/// A backend-supplied pilar definition. When the backend publishes a
/// dynamic list it replaces the static seed wholesale, including the
/// default locking flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilarDefinition {
    pub id: u32,
    pub titulo: String,
    pub subtitulo: String,
    pub concepto: String,
    pub accion: String,
    pub ejercicio: String,
    #[serde(default)]
    pub is_locked_by_default: bool,
}

/// Per-user progress row, keyed by (user, pilar).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PilarProgress {
    pub pilar_id: u32,
    pub completed: bool,
    pub unlocked: bool,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Resolve the effective pilar list from the static seed, an optional
/// dynamic definition list, and the user's progress rows.
///
/// Precedence, highest first: explicit progress rows, then dynamic
/// definitions, then the static seed. When definitions are present they
/// are authoritative for content and default locking; otherwise progress
/// rows overlay the seed. The result is sorted by ordinal.
pub fn merge(
    defaults: Vec<Pilar>,
    definitions: &[PilarDefinition],
    progress: &[PilarProgress],
) -> Vec<Pilar> {
    let find = |id: u32| progress.iter().find(|p| p.pilar_id == id);

    let mut resolved: Vec<Pilar> = if definitions.is_empty() {
        defaults
            .into_iter()
            .map(|mut p| {
                if let Some(row) = find(p.id) {
                    p.completado = row.completed;
                    p.bloqueado = !row.unlocked;
                }
                p
            })
            .collect()
    } else {
        definitions
            .iter()
            .map(|d| {
                let row = find(d.id);
                Pilar {
                    id: d.id,
                    titulo: d.titulo.clone(),
                    subtitulo: d.subtitulo.clone(),
                    concepto: d.concepto.clone(),
                    accion: d.accion.clone(),
                    ejercicio: d.ejercicio.clone(),
                    completado: row.map(|r| r.completed).unwrap_or(false),
                    bloqueado: row.map(|r| !r.unlocked).unwrap_or(d.is_locked_by_default),
                }
            })
            .collect()
    };

    resolved.sort_by_key(|p| p.id);
    resolved
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
