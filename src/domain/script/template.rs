use crate::domain::sources::SourceItem;
use crate::domain::voice::LanguageCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => DayPart::Morning,
            12..=16 => DayPart::Afternoon,
            _ => DayPart::Evening,
        }
    }
}

fn greeting(language: LanguageCode, part: DayPart) -> &'static str {
    use DayPart::*;
    use LanguageCode::*;
    match (language, part) {
        (English, Morning) => "Good morning",
        (English, Afternoon) => "Good afternoon",
        (English, Evening) => "Good evening",
        (Spanish, Morning) => "Buenos días",
        (Spanish, _) => "Buenas tardes",
        (French, Evening) => "Bonsoir",
        (French, _) => "Bonjour",
        (German, Morning) => "Guten Morgen",
        (German, Afternoon) => "Guten Tag",
        (German, Evening) => "Guten Abend",
        (Italian, Evening) => "Buonasera",
        (Italian, _) => "Buongiorno",
        (Portuguese, Morning) => "Bom dia",
        (Portuguese, Afternoon) => "Boa tarde",
        (Portuguese, Evening) => "Boa noite",
    }
}

fn join_topics(topics: &[String]) -> String {
    match topics {
        [] => String::new(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} & {}", rest.join(", "), last),
    }
}

fn format_minutes(minutes: f64) -> String {
    if (minutes - minutes.round()).abs() < f64::EPSILON {
        format!("{}", minutes.round() as i64)
    } else {
        format!("{:.1}", minutes)
    }
}

pub fn intro(language: LanguageCode, part: DayPart, minutes: f64, topics: &[String]) -> String {
    let hello = greeting(language, part);
    let topics = join_topics(topics);
    let minutes = format_minutes(minutes);
    match language {
        LanguageCode::English => format!("{hello}. Here is your {minutes}-minute briefing on {topics}."),
        LanguageCode::Spanish => format!("{hello}. Este es tu resumen de {minutes} minutos sobre {topics}."),
        LanguageCode::French => format!("{hello}. Voici votre point de {minutes} minutes sur {topics}."),
        LanguageCode::German => format!("{hello}. Hier ist Ihr {minutes}-Minuten-Überblick zu {topics}."),
        LanguageCode::Italian => format!("{hello}. Ecco il tuo notiziario di {minutes} minuti su {topics}."),
        LanguageCode::Portuguese => format!("{hello}. Este é o seu resumo de {minutes} minutos sobre {topics}."),
    }
}

pub fn outro(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => "That's your briefing. Stay informed.",
        LanguageCode::Spanish => "Eso es todo por ahora. Mantente informado.",
        LanguageCode::French => "C'est tout pour ce point. Restez informés.",
        LanguageCode::German => "Das war Ihr Überblick. Bleiben Sie informiert.",
        LanguageCode::Italian => "Questo è tutto. Restate informati.",
        LanguageCode::Portuguese => "Este foi o seu resumo. Mantenha-se informado.",
    }
}

/// Sentence appended when a script must be padded to reach its minimum length
pub fn filler_sentence(language: LanguageCode) -> &'static str {
    match language {
        LanguageCode::English => "We will keep following these stories closely and bring you further updates as they develop.",
        LanguageCode::Spanish => "Seguiremos de cerca estas noticias y te traeremos nuevas actualizaciones a medida que avancen.",
        LanguageCode::French => "Nous continuerons de suivre ces sujets de près et vous tiendrons informés de leur évolution.",
        LanguageCode::German => "Wir verfolgen diese Themen weiter genau und halten Sie über neue Entwicklungen auf dem Laufenden.",
        LanguageCode::Italian => "Continueremo a seguire da vicino queste notizie e vi aggiorneremo sui prossimi sviluppi.",
        LanguageCode::Portuguese => "Continuaremos acompanhando essas notícias de perto e traremos novas atualizações em breve.",
    }
}

/// Body used when the collectors found nothing recent. No model involved.
pub fn no_news_body(language: LanguageCode, topics: &[String]) -> String {
    let topics = join_topics(topics);
    match language {
        LanguageCode::English => format!(
            "There are no recent developments to report on {topics} right now. \
             We checked the latest sources and found no new stories in the last day. \
             We will keep watching and bring you the next update as soon as there is news."
        ),
        LanguageCode::Spanish => format!(
            "No hay novedades recientes sobre {topics} en este momento. \
             Revisamos las últimas fuentes y no encontramos noticias nuevas en el último día. \
             Seguiremos atentos y te traeremos la próxima actualización en cuanto haya noticias."
        ),
        LanguageCode::French => format!(
            "Aucune nouveauté récente à signaler sur {topics} pour le moment. \
             Nous avons consulté les dernières sources sans trouver de nouvel article depuis hier. \
             Nous restons attentifs et reviendrons vers vous dès qu'il y aura du nouveau."
        ),
        LanguageCode::German => format!(
            "Zu {topics} gibt es derzeit keine neuen Entwicklungen. \
             Wir haben die aktuellen Quellen geprüft und am letzten Tag keine neuen Meldungen gefunden. \
             Wir bleiben dran und melden uns, sobald es Neuigkeiten gibt."
        ),
        LanguageCode::Italian => format!(
            "Non ci sono sviluppi recenti su {topics} in questo momento. \
             Abbiamo controllato le ultime fonti senza trovare nuove notizie nell'ultimo giorno. \
             Continueremo a seguire e vi aggiorneremo appena ci saranno novità."
        ),
        LanguageCode::Portuguese => format!(
            "Não há novidades recentes sobre {topics} neste momento. \
             Verificamos as fontes mais recentes e não encontramos notícias novas no último dia. \
             Continuaremos atentos e traremos a próxima atualização assim que houver notícias."
        ),
    }
}

/// Seed text for the deterministic fallback when the model never answered:
/// the headlines themselves, read as sentences.
pub fn headline_digest(items: &[SourceItem]) -> String {
    items
        .iter()
        .map(|item| {
            let title = item.title.trim().trim_end_matches(|c: char| c == '.' || c == ':');
            if item.source.is_empty() {
                format!("{}.", title)
            } else {
                format!("{}, reports {}.", title, item.source)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
