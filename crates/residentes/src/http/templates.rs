//! Server-rendered HTML.

use std::fmt::Write as _;

use crate::resident::{MaritalStatus, Resident, ResidentInput};
use crate::validation::ValidationErrors;

/// Escape text for use in element content and quoted attributes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"es\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title} - Registro de Residentes</title>\n\
         </head>\n\
         <body>\n\
         <header><a href=\"/\">Registro de Residentes</a></header>\n\
         <main>\n\
         {body}\n\
         </main>\n\
         </body>\n\
         </html>\n",
        title = escape(title),
    )
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

/// Listing page with one row per resident.
pub(crate) fn index_page(residents: &[Resident]) -> String {
    let mut body = String::from(
        "<h1>Residentes</h1>\n<p><a href=\"/residentes/nuevo\">Nuevo residente</a></p>\n",
    );

    if residents.is_empty() {
        body.push_str("<p>No hay residentes registrados.</p>");
        return layout("Residentes", &body);
    }

    body.push_str(
        "<table>\n<thead><tr>\
         <th>Nombre</th><th>Fecha de nacimiento</th><th>Pasaporte</th>\
         <th>Email</th><th>Teléfono</th><th>Estado civil</th><th></th>\
         </tr></thead>\n<tbody>\n",
    );
    for resident in residents {
        let _ = writeln!(
            body,
            "<tr><td>{name}</td><td>{birth}</td><td>{passport}</td><td>{email}</td>\
             <td>{phone}</td><td>{status}</td>\
             <td><a href=\"/residentes/{id}/editar\">Editar</a> \
             <form method=\"post\" action=\"/residentes/{id}/eliminar\">\
             <button type=\"submit\">Eliminar</button></form></td></tr>",
            id = resident.id,
            name = escape(&resident.full_name()),
            birth = resident.birth_date.format("%Y-%m-%d"),
            passport = escape(&resident.passport),
            email = escape(&resident.email),
            phone = optional(resident.phone.as_deref()),
            status = optional(resident.marital_status.as_deref()),
        );
    }
    body.push_str("</tbody>\n</table>");

    layout("Residentes", &body)
}

/// Label shown next to a field and in front of its error.
fn field_label(field: &str) -> &str {
    match field {
        "first_name" => "Nombre",
        "last_name" => "Apellido",
        "birth_date" => "Fecha de nacimiento",
        "passport" => "Pasaporte",
        "email" => "Email",
        "phone" => "Teléfono",
        "address" => "Dirección",
        "occupation" => "Ocupación",
        "marital_status" => "Estado civil",
        "body" => "Formulario",
        other => other,
    }
}

/// What the form submits to and how it is labelled.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FormMode {
    Create,
    Edit(i64),
}

impl FormMode {
    fn action(self) -> String {
        match self {
            Self::Create => "/residentes/nuevo".to_string(),
            Self::Edit(id) => format!("/residentes/{id}/editar"),
        }
    }

    fn title(self) -> &'static str {
        match self {
            Self::Create => "Nuevo residente",
            Self::Edit(_) => "Editar residente",
        }
    }
}

fn text_input(out: &mut String, name: &str, kind: &str, value: Option<&str>) {
    let _ = writeln!(
        out,
        "<p><label for=\"{name}\">{label}</label> \
         <input type=\"{kind}\" id=\"{name}\" name=\"{name}\" value=\"{value}\"></p>",
        label = field_label(name),
        value = optional(value),
    );
}

fn marital_status_select(out: &mut String, selected: Option<&str>) {
    out.push_str(
        "<p><label for=\"marital_status\">Estado civil</label> \
         <select id=\"marital_status\" name=\"marital_status\">\n<option value=\"\"></option>\n",
    );
    for status in MaritalStatus::ALL {
        let value = status.as_str();
        let mark = if selected == Some(value) { " selected" } else { "" };
        let _ = writeln!(
            out,
            "<option value=\"{v}\"{mark}>{v}</option>",
            v = escape(value)
        );
    }
    out.push_str("</select></p>\n");
}

/// Create or edit form, pre-filled with `input` and listing `errors` if any.
pub(crate) fn form_page(
    mode: FormMode,
    input: &ResidentInput,
    errors: Option<&ValidationErrors>,
) -> String {
    let mut body = format!("<h1>{}</h1>\n", mode.title());

    if let Some(errors) = errors.filter(|e| !e.is_empty()) {
        body.push_str("<ul class=\"errors\">\n");
        for error in errors.errors() {
            let _ = writeln!(
                body,
                "<li>{}: {}</li>",
                field_label(error.field),
                escape(&error.message)
            );
        }
        body.push_str("</ul>\n");
    }

    let _ = writeln!(body, "<form method=\"post\" action=\"{}\">", mode.action());
    text_input(&mut body, "first_name", "text", input.first_name.as_deref());
    text_input(&mut body, "last_name", "text", input.last_name.as_deref());
    text_input(&mut body, "birth_date", "date", input.birth_date.as_deref());
    text_input(&mut body, "passport", "text", input.passport.as_deref());
    text_input(&mut body, "email", "email", input.email.as_deref());
    text_input(&mut body, "phone", "tel", input.phone.as_deref());
    text_input(&mut body, "address", "text", input.address.as_deref());
    text_input(&mut body, "occupation", "text", input.occupation.as_deref());
    marital_status_select(&mut body, input.marital_status.as_deref());
    body.push_str("<p><button type=\"submit\">Guardar</button> <a href=\"/\">Cancelar</a></p>\n</form>");

    layout(mode.title(), &body)
}

/// A page showing only a heading and a message.
pub(crate) fn error_page(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Volver al listado</a></p>",
            escape(title),
            escape(message)
        ),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::validation::validate_resident;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn resident(id: i64) -> Resident {
        Resident {
            id,
            first_name: "Ana".to_string(),
            last_name: "<Ruiz>".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 3, 9).unwrap(),
            passport: "X1234567".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            address: None,
            occupation: None,
            marital_status: Some("Unión Libre".to_string()),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("José"), "José");
    }

    #[test]
    fn test_index_page_lists_residents_escaped() {
        let html = index_page(&[resident(4)]);
        assert!(html.contains("Ana &lt;Ruiz&gt;"));
        assert!(html.contains("1985-03-09"));
        assert!(html.contains("href=\"/residentes/4/editar\""));
        assert!(html.contains("action=\"/residentes/4/eliminar\""));
        assert!(!html.contains("<Ruiz>"));
    }

    #[test]
    fn test_index_page_empty() {
        let html = index_page(&[]);
        assert!(html.contains("No hay residentes registrados."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_form_page_preserves_values_and_errors() {
        let input = ResidentInput {
            first_name: Some("Ana\"".to_string()),
            birth_date: Some("1985-03-09".to_string()),
            marital_status: Some("Casada".to_string()),
            ..Default::default()
        };
        let errors = ValidationErrors::single("email", "El email es requerido");

        let html = form_page(FormMode::Create, &input, Some(&errors));
        assert!(html.contains("value=\"Ana&quot;\""));
        assert!(html.contains("type=\"date\" id=\"birth_date\" name=\"birth_date\" value=\"1985-03-09\""));
        assert!(html.contains("<option value=\"Casada\" selected>"));
        assert!(html.contains("<li>Email: El email es requerido</li>"));
        assert!(html.contains("action=\"/residentes/nuevo\""));
    }

    #[test]
    fn test_form_errors_name_their_field() {
        let errors = validate_resident(&ResidentInput::default(), today()).unwrap_err();

        let html = form_page(FormMode::Create, &ResidentInput::default(), Some(&errors));
        assert!(html.contains("<li>Nombre: El campo no puede estar vacío</li>"));
        assert!(html.contains("<li>Apellido: El campo no puede estar vacío</li>"));
        assert!(html.contains("<li>Pasaporte: El pasaporte es obligatorio</li>"));
    }

    #[test]
    fn test_form_page_offers_every_marital_status() {
        let html = form_page(FormMode::Edit(9), &ResidentInput::default(), None);
        for status in MaritalStatus::ALL {
            assert!(html.contains(&format!("<option value=\"{status}\">")));
        }
        assert!(html.contains("action=\"/residentes/9/editar\""));
        assert!(!html.contains("class=\"errors\""));
    }

    #[test]
    fn test_error_page() {
        let html = error_page("No encontrado", "Residente no encontrado");
        assert!(html.contains("<h1>No encontrado</h1>"));
        assert!(html.contains("<p>Residente no encontrado</p>"));
    }
}
