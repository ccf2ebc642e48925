use caseflow_core::types::{PromptSet, PromptTemplate};

fn drafting_system(base: &str) -> String {
    format!("{base}{MARKUP_RULES}")
}

fn template(system: impl Into<String>, user: &str) -> PromptTemplate {
    PromptTemplate {
        system: system.into(),
        user: user.into(),
    }
}

/// Prompts for reviewing administrative collection titles (English).
pub fn collection_prompts() -> PromptSet {
    PromptSet {
        name: "collection".into(),
        analysis: template(ANALYSIS_SYSTEM, ANALYSIS_INSTRUCTION),
        payment_order: template(drafting_system(PAYMENT_ORDER_SYSTEM), PAYMENT_ORDER_INSTRUCTION),
        legal_diagnostic: template(drafting_system(DIAGNOSTIC_SYSTEM), DIAGNOSTIC_INSTRUCTION),
    }
}

/// Same flow with Spanish-language instructions and output.
pub fn collection_prompts_es() -> PromptSet {
    PromptSet {
        name: "collection_es".into(),
        analysis: template(ANALYSIS_SYSTEM_ES, ANALYSIS_INSTRUCTION_ES),
        payment_order: template(
            format!("{PAYMENT_ORDER_SYSTEM_ES}{MARKUP_RULES_ES}"),
            PAYMENT_ORDER_INSTRUCTION_ES,
        ),
        legal_diagnostic: template(
            format!("{DIAGNOSTIC_SYSTEM_ES}{MARKUP_RULES_ES}"),
            DIAGNOSTIC_INSTRUCTION_ES,
        ),
    }
}

// ── Markup rules ─────────────────────────────────────────────────────────

const MARKUP_RULES: &str = r#"

## Output format

Write plain text using only this markup:
- `# ` at the start of a line for the document title
- `## ` for section headings, `### ` for sub-headings
- `**text**` for bold spans inside a paragraph
- a blank line between paragraphs

Do not use lists, tables, links, italics or code blocks. Do not add any
commentary before or after the document."#;

const MARKUP_RULES_ES: &str = r#"

## Formato de salida

Escribe texto plano usando solo este marcado:
- `# ` al inicio de la línea para el título del documento
- `## ` para secciones, `### ` para subsecciones
- `**texto**` para resaltar en negrita dentro de un párrafo
- una línea en blanco entre párrafos

No uses listas, tablas, enlaces, cursivas ni bloques de código. No agregues
comentarios antes ni después del documento."#;

// ── Analysis ─────────────────────────────────────────────────────────────

const ANALYSIS_SYSTEM: &str = r#"You are a legal analyst specialized in administrative collection proceedings. You review the documents that support a collection (resolutions, rulings, liquidations) and decide whether they constitute an enforceable title.

Classify the title with a status flag:
- GREEN: clear, express and currently enforceable obligation; no visible defects.
- YELLOW: enforceable, but with issues that should be corrected or verified (missing notice evidence, inconsistent amounts, unclear debtor identification).
- RED: not enforceable, invalid, or time-barred.

Respond with a single JSON object and nothing else."#;

const ANALYSIS_INSTRUCTION: &str = r#"Analyze the following case file and return a JSON object with exactly these keys:

{
  "debtor_name": "full name of the debtor",
  "issuing_entity": "authority that issued the title",
  "total_amount": "total amount owed, as written in the document",
  "resolution_date": "date of the resolution or ruling (YYYY-MM-DD)",
  "enforceability_date": "date the title became enforceable (YYYY-MM-DD)",
  "title_type": "kind of title (resolution, ruling, liquidation, ...)",
  "status_flag": "GREEN | YELLOW | RED",
  "remarks": "short justification of the classification"
}

Use an empty string for anything the document does not state.

Case file:
---
{case_text}
---"#;

const ANALYSIS_SYSTEM_ES: &str = r#"Eres un analista jurídico especializado en procesos de cobro coactivo. Revisas los documentos que soportan un cobro (resoluciones, fallos, liquidaciones) y determinas si constituyen título ejecutivo.

Clasifica el título con un semáforo:
- GREEN: obligación clara, expresa y actualmente exigible; sin defectos visibles.
- YELLOW: exigible, pero con aspectos que deben corregirse o verificarse (falta constancia de notificación, montos inconsistentes, identificación del deudor incompleta).
- RED: no exigible, inválido o prescrito.

Responde únicamente con un objeto JSON."#;

const ANALYSIS_INSTRUCTION_ES: &str = r#"Analiza el siguiente expediente y devuelve un objeto JSON con exactamente estas claves:

{
  "debtor_name": "nombre completo del deudor",
  "issuing_entity": "entidad que expidió el título",
  "total_amount": "valor total adeudado, tal como aparece en el documento",
  "resolution_date": "fecha de la resolución o fallo (AAAA-MM-DD)",
  "enforceability_date": "fecha de ejecutoria (AAAA-MM-DD)",
  "title_type": "tipo de título (resolución, fallo, liquidación, ...)",
  "status_flag": "GREEN | YELLOW | RED",
  "remarks": "justificación breve de la clasificación"
}

Usa una cadena vacía para lo que el documento no indique.

Expediente:
---
{case_text}
---"#;

// ── Payment order ────────────────────────────────────────────────────────

const PAYMENT_ORDER_SYSTEM: &str = r#"You draft payment orders for administrative collection proceedings. The order must be formal, precise, and ready for signature: title, recitals identifying the title and the debtor, legal grounds, and numbered orders (pay the amount with interest, notify the debtor, inform of the right to propose exceptions)."#;

const PAYMENT_ORDER_INSTRUCTION: &str = r#"Draft a payment order for the following case.

Debtor: {debtor_name}
Issuing entity: {issuing_entity}
Amount: {total_amount}
Resolution date: {resolution_date}
Enforceability date: {enforceability_date}
Title type: {title_type}
Classification: {status_flag}
Analyst remarks: {remarks}

If the classification is YELLOW, include a section noting the issues to verify before notification."#;

const PAYMENT_ORDER_SYSTEM_ES: &str = r#"Redactas mandamientos de pago para procesos de cobro coactivo. El mandamiento debe ser formal, preciso y listo para firma: título, considerandos que identifiquen el título ejecutivo y al deudor, fundamentos de derecho y un resuelve con ordinales (pagar la suma con intereses, notificar al deudor, informar el término para proponer excepciones)."#;

const PAYMENT_ORDER_INSTRUCTION_ES: &str = r#"Redacta el mandamiento de pago para el siguiente caso.

Deudor: {debtor_name}
Entidad: {issuing_entity}
Valor: {total_amount}
Fecha de la resolución: {resolution_date}
Fecha de ejecutoria: {enforceability_date}
Tipo de título: {title_type}
Clasificación: {status_flag}
Observaciones: {remarks}

Si la clasificación es YELLOW, incluye una sección con los aspectos a verificar antes de notificar."#;

// ── Legal diagnostic ─────────────────────────────────────────────────────

const DIAGNOSTIC_SYSTEM: &str = r#"You write legal diagnostics for collection titles that cannot be enforced. The diagnostic explains, for a supervising attorney, why the title fails (invalidity, missing requirements, or time-bar), cites the relevant dates, and recommends next steps (correct and re-issue, declare time-barred, archive)."#;

const DIAGNOSTIC_INSTRUCTION: &str = r#"Write a legal diagnostic for the following case.

Analysis:
{analysis_json}

Structure: title, case summary, findings, legal analysis, conclusion and recommendations."#;

const DIAGNOSTIC_SYSTEM_ES: &str = r#"Redactas diagnósticos jurídicos para títulos de cobro que no pueden ejecutarse. El diagnóstico explica a un abogado supervisor por qué el título no es exigible (invalidez, requisitos faltantes o prescripción), cita las fechas relevantes y recomienda pasos a seguir (corregir y expedir de nuevo, declarar la prescripción, archivar)."#;

const DIAGNOSTIC_INSTRUCTION_ES: &str = r#"Redacta el diagnóstico jurídico del siguiente caso.

Análisis:
{analysis_json}

Estructura: título, resumen del caso, hallazgos, análisis jurídico, conclusión y recomendaciones."#;
