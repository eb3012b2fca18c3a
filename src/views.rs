//! Server-rendered pages. Every function returns a full HTML document; all
//! stored text goes through [`escape`] before it is interpolated.

use crate::models::{Harvest, Plant};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn text(value: Option<&str>) -> String {
    escape(value.unwrap_or(""))
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{} | Arbolitos</title></head><body>\
<nav><a href=\"/\">Plants</a> | <a href=\"/create\">New plant</a> | <a href=\"/about\">About</a></nav>\
<main>{}</main>\
</body></html>",
        escape(title),
        body
    )
}

fn plant_form(action: &str, submit: &str, plant: Option<&Plant>) -> String {
    let (name, variety, photo, planted) = match plant {
        Some(p) => (
            text(p.name.as_deref()),
            text(p.variety.as_deref()),
            text(p.photo_url.as_deref()),
            text(p.date_planted.as_deref()),
        ),
        None => Default::default(),
    };
    format!(
        "<form method=\"post\" action=\"{action}\">\
<label>Name <input type=\"text\" name=\"plant_name\" value=\"{name}\"></label>\
<label>Variety <input type=\"text\" name=\"variety\" value=\"{variety}\"></label>\
<label>Photo URL <input type=\"url\" name=\"photo\" value=\"{photo}\"></label>\
<label>Date planted <input type=\"date\" name=\"date_planted\" value=\"{planted}\"></label>\
<button type=\"submit\">{submit}</button>\
</form>"
    )
}

pub fn plants_list(plants: &[Plant]) -> String {
    let mut list = String::new();
    for plant in plants {
        let photo = match plant.photo_url.as_deref() {
            Some(url) if !url.is_empty() => {
                format!("<img src=\"{}\" alt=\"\" width=\"120\">", escape(url))
            }
            _ => String::new(),
        };
        list.push_str(&format!(
            "<li>{photo}<a href=\"/plant/{}\">{}</a> <small>{}</small></li>",
            plant.id_hex(),
            text(plant.name.as_deref()),
            text(plant.variety.as_deref())
        ));
    }
    if list.is_empty() {
        list.push_str("<li>No plants yet. <a href=\"/create\">Add one</a>.</li>");
    }
    layout("Plants", &format!("<h1>My plants</h1><ul>{list}</ul>"))
}

pub fn about() -> String {
    layout(
        "About",
        "<h1>About</h1>\
<p>Arbolitos keeps a record of the plants in the garden and every harvest they give.</p>",
    )
}

pub fn create_form() -> String {
    layout(
        "New plant",
        &format!("<h1>New plant</h1>{}", plant_form("/create", "Create", None)),
    )
}

pub fn detail(plant: &Plant, harvests: &[Harvest]) -> String {
    let id = plant.id_hex();
    let photo = match plant.photo_url.as_deref() {
        Some(url) if !url.is_empty() => format!("<img src=\"{}\" alt=\"\">", escape(url)),
        _ => String::new(),
    };
    let mut rows = String::new();
    for harvest in harvests {
        rows.push_str(&format!(
            "<li>{} <small>{}</small></li>",
            text(harvest.quantity.as_deref()),
            text(harvest.date.as_deref())
        ));
    }
    if rows.is_empty() {
        rows.push_str("<li>No harvests yet.</li>");
    }
    let body = format!(
        "<h1>{}</h1>{photo}\
<p>Variety: {}</p><p>Planted: {}</p>\
<p><a href=\"/edit/{id}\">Edit</a></p>\
<form method=\"post\" action=\"/delete/{id}\"><button type=\"submit\">Delete</button></form>\
<h2>Harvests</h2><ul>{rows}</ul>\
<form method=\"post\" action=\"/harvest/{id}\">\
<label>Amount <input type=\"text\" name=\"harvested_amount\" placeholder=\"3 tomatoes\"></label>\
<label>Date <input type=\"date\" name=\"date_planted\"></label>\
<button type=\"submit\">Log harvest</button>\
</form>",
        text(plant.name.as_deref()),
        text(plant.variety.as_deref()),
        text(plant.date_planted.as_deref()),
    );
    layout(plant.name.as_deref().unwrap_or("Plant"), &body)
}

pub fn edit_form(plant: &Plant) -> String {
    let action = format!("/edit/{}", plant.id_hex());
    layout(
        "Edit plant",
        &format!(
            "<h1>Edit {}</h1>{}",
            text(plant.name.as_deref()),
            plant_form(&action, "Save", Some(plant))
        ),
    )
}

pub fn not_found() -> String {
    layout(
        "Not found",
        "<h1>404</h1><p>That page or plant does not exist. <a href=\"/\">Back to the list</a>.</p>",
    )
}

pub fn server_error() -> String {
    layout(
        "Error",
        "<h1>500</h1><p>Something went wrong while talking to the database.</p>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlantRef;
    use mongodb::bson::oid::ObjectId;

    fn plant(name: &str) -> Plant {
        Plant {
            id: Some(ObjectId::new()),
            name: Some(name.to_string()),
            variety: Some("Roma".to_string()),
            photo_url: None,
            date_planted: Some("2023-05-01".to_string()),
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn list_links_each_plant_and_escapes_names() {
        let p = plant("<script>");
        let html = plants_list(std::slice::from_ref(&p));
        assert!(html.contains(&format!("href=\"/plant/{}\"", p.id_hex())));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_list_invites_creation() {
        assert!(plants_list(&[]).contains("No plants yet"));
    }

    #[test]
    fn detail_shows_harvests_and_forms() {
        let p = plant("Tomato");
        let id = p.id.unwrap();
        let harvests = vec![Harvest {
            id: Some(ObjectId::new()),
            plant_id: PlantRef::from(id),
            quantity: Some("3 tomatoes".to_string()),
            date: Some("2023-07-01".to_string()),
        }];
        let html = detail(&p, &harvests);
        assert!(html.contains("3 tomatoes"));
        assert!(html.contains(&format!("action=\"/harvest/{}\"", id.to_hex())));
        assert!(html.contains(&format!("action=\"/delete/{}\"", id.to_hex())));
        assert!(html.contains("name=\"harvested_amount\""));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let p = plant("Tomato");
        let html = edit_form(&p);
        assert!(html.contains("name=\"plant_name\" value=\"Tomato\""));
        assert!(html.contains("name=\"variety\" value=\"Roma\""));
        assert!(html.contains("name=\"photo\" value=\"\""));
        assert!(html.contains(&format!("action=\"/edit/{}\"", p.id_hex())));
    }

    #[test]
    fn create_form_posts_to_create() {
        let html = create_form();
        assert!(html.contains("action=\"/create\""));
        assert!(html.contains("name=\"plant_name\" value=\"\""));
    }
}
