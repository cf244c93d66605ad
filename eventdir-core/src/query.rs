//! Facet state <=> query string.
//!
//! Only non-default facets are written, so an untouched state encodes to an
//! empty string. Decoding never fails: unknown parameters are ignored and
//! odd values are kept as opaque selections that simply match nothing.
//!
//! Multi-valued facets are one comma-joined parameter. Each value is
//! percent-encoded on its own (a comma inside a value becomes `%2C`), so
//! values containing commas still round-trip.

use std::borrow::Cow;

use crate::facet::{Facet, FacetState, Selection, TimeWindow};

pub const SEARCH_PARAM: &str = "search";
pub const TIME_PARAM: &str = "time";
pub const FREE_PARAM: &str = "free";
pub const ONLINE_PARAM: &str = "online";

/// One-shot "scroll to this event" request. Never part of the facet state.
pub const DEEP_LINK_PARAM: &str = "event";

/// Serialize the facet state into a query string (without the leading `?`).
pub fn encode(state: &FacetState) -> String {
    let mut params: Vec<(&str, String)> = Vec::new();

    if let Some(search) = state.search_text() {
        params.push((SEARCH_PARAM, encode_component(search).into_owned()));
    }
    push_list(&mut params, Facet::Country, &state.countries);
    push_list(&mut params, Facet::City, &state.cities);
    push_list(&mut params, Facet::EventType, &state.event_types);
    if state.time_window != TimeWindow::default() {
        params.push((TIME_PARAM, state.time_window.as_str().to_string()));
    }
    push_list(&mut params, Facet::Organizer, &state.organizers);
    push_list(&mut params, Facet::Language, &state.languages);
    if state.free_only {
        params.push((FREE_PARAM, "true".to_string()));
    }
    if state.online_only {
        params.push((ONLINE_PARAM, "true".to_string()));
    }
    push_list(&mut params, Facet::Tag, &state.tags);

    params
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_list(params: &mut Vec<(&str, String)>, facet: Facet, values: &Selection) {
    if values.is_empty() {
        return;
    }
    let joined = values
        .iter()
        .map(|v| encode_component(v))
        .collect::<Vec<_>>()
        .join(",");
    params.push((facet.param(), joined));
}

/// Rebuild a facet state from a query string. A leading `?` is allowed.
///
/// Absent parameters mean "default". Repeated list parameters are merged;
/// for scalar parameters the first occurrence wins.
pub fn decode(query: &str) -> FacetState {
    let mut state = FacetState::default();
    let mut seen_search = false;
    let mut seen_time = false;

    for (key, raw) in pairs(query) {
        if let Some(facet) = Facet::ALL.iter().find(|f| f.param() == key) {
            let selection = state.selection_mut(*facet);
            for value in raw.split(',') {
                let value = decode_component(value);
                let value = value.trim();
                if !value.is_empty() {
                    selection.insert(value.to_string());
                }
            }
            continue;
        }

        match key.as_str() {
            SEARCH_PARAM if !seen_search => {
                seen_search = true;
                let text = decode_component(raw);
                if !text.trim().is_empty() {
                    state.search = Some(text.into_owned());
                }
            }
            TIME_PARAM if !seen_time => {
                seen_time = true;
                state.time_window = TimeWindow::from_param(&decode_component(raw));
            }
            FREE_PARAM => state.free_only = is_truthy(raw),
            ONLINE_PARAM => state.online_only = is_truthy(raw),
            _ => {}
        }
    }

    state
}

/// The `event=<id>` deep link carried by a query string, if any.
pub fn deep_link(query: &str) -> Option<String> {
    pairs(query)
        .find(|(key, _)| key == DEEP_LINK_PARAM)
        .map(|(_, raw)| decode_component(raw).into_owned())
        .filter(|id| !id.is_empty())
}

/// Query for sharing a single event under the current filters.
pub fn share_query(state: &FacetState, event_id: &str) -> String {
    let encoded = encode(state);
    let link = format!("{DEEP_LINK_PARAM}={}", encode_component(event_id));
    if encoded.is_empty() {
        link
    } else {
        format!("{encoded}&{link}")
    }
}

/// Join a path and query the way an address bar shows them.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Raw `key=value` pairs. Keys are decoded, values are left raw so list
/// values can be split on literal commas first.
fn pairs(query: &str) -> impl Iterator<Item = (String, &str)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key).into_owned(), value)
        })
}

fn is_truthy(raw: &str) -> bool {
    !matches!(
        decode_component(raw).to_ascii_lowercase().as_str(),
        "false" | "0" | "off" | "no"
    )
}

fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Percent-decode, treating `+` as a space. Invalid UTF-8 is replaced
/// rather than rejected.
fn decode_component(value: &str) -> Cow<'_, str> {
    if !value.contains(['%', '+']) {
        return Cow::Borrowed(value);
    }
    let spaced = value.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(values: &[&str]) -> Selection {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_default_state_encodes_empty() {
        assert_eq!(encode(&FacetState::default()), "");
        assert_eq!(decode(""), FacetState::default());
        assert_eq!(decode("?"), FacetState::default());
    }

    #[test]
    fn test_countries_and_free_only() {
        let state = FacetState {
            countries: selection(&["us", "de"]),
            free_only: true,
            ..Default::default()
        };

        let query = encode(&state);
        assert_eq!(query, "country=us,de&free=true");

        let decoded = decode(&query);
        assert_eq!(decoded, state);
        assert!(decoded.cities.is_empty());
        assert_eq!(decoded.time_window, TimeWindow::Future);
        assert!(!decoded.online_only);
    }

    #[test]
    fn test_full_state_round_trips() {
        let state = FacetState {
            search: Some("rust & friends".into()),
            event_types: selection(&["Conference", "Meetup"]),
            countries: selection(&["se"]),
            cities: selection(&["Malmö", "New York"]),
            organizers: selection(&["rust-lang"]),
            languages: selection(&["en", "sv"]),
            tags: selection(&["c++", "a,b", "50%"]),
            time_window: TimeWindow::Past,
            free_only: true,
            online_only: true,
        };

        let query = encode(&state);
        assert_eq!(decode(&query), state);
        assert!(query.contains("tags=c%2B%2B,a%2Cb,50%25"));
        assert!(query.contains("time=past"));
    }

    #[test]
    fn test_param_order_is_stable() {
        let state = FacetState {
            search: Some("x".into()),
            tags: selection(&["t"]),
            event_types: selection(&["Meetup"]),
            online_only: true,
            time_window: TimeWindow::All,
            ..Default::default()
        };
        assert_eq!(encode(&state), "search=x&type=Meetup&time=all&online=true&tags=t");
    }

    #[test]
    fn test_blank_search_is_omitted() {
        let state = FacetState {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(encode(&state), "");
        assert_eq!(decode("search=%20%20").search, None);
    }

    #[test]
    fn test_decode_ignores_unknown_and_deep_link() {
        let state = decode("?utm_source=mail&event=rustconf&tags=rust&=&junk");
        assert_eq!(state.tags, selection(&["rust"]));
        assert_eq!(encode(&state), "tags=rust");
    }

    #[test]
    fn test_decode_tolerates_odd_values() {
        let state = decode("type=,Meetup,,%ZZ&time=fortnight&country=%E0%A4");
        assert_eq!(state.event_types, selection(&["Meetup", "%ZZ"]));
        assert_eq!(state.time_window, TimeWindow::All);
        assert_eq!(state.countries.len(), 1);
    }

    #[test]
    fn test_decode_plus_as_space() {
        let state = decode("search=open+source&city=San+Francisco");
        assert_eq!(state.search.as_deref(), Some("open source"));
        assert_eq!(state.cities, selection(&["San Francisco"]));
    }

    #[test]
    fn test_decode_merges_repeated_lists() {
        let state = decode("country=us&country=de,us");
        assert_eq!(state.countries, selection(&["us", "de"]));
    }

    #[test]
    fn test_boolean_presence() {
        assert!(decode("free").free_only);
        assert!(decode("free=1").free_only);
        assert!(decode("online=true").online_only);
        assert!(!decode("online=false").online_only);
    }

    #[test]
    fn test_deep_link() {
        assert_eq!(deep_link("?tags=rust&event=rustconf-2025"), Some("rustconf-2025".into()));
        assert_eq!(deep_link("event="), None);
        assert_eq!(deep_link("tags=rust"), None);
    }

    #[test]
    fn test_share_query() {
        let state = FacetState {
            tags: selection(&["rust"]),
            ..Default::default()
        };
        assert_eq!(share_query(&state, "rustconf"), "tags=rust&event=rustconf");
        assert_eq!(share_query(&FacetState::default(), "a b"), "event=a%20b");
        assert_eq!(decode(&share_query(&state, "rustconf")), state);
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/", ""), "/");
        assert_eq!(with_query("/", "free=true"), "/?free=true");
    }
}
