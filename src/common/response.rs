// src/common/response.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeMap, Serialize, Serializer};

/// Recurso exposto pela API dentro do envelope `data`.
pub trait ApiResource: Serialize {
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// Chave da lista de ids: `uuids` ou `names`.
    const ID_LIST: &'static str = "uuids";

    fn api_id(&self) -> String;
}

#[derive(Serialize)]
pub struct Envelope<D> {
    pub data: D,
}

// `{"<singular>": {...}}`
struct Keyed<'a, T> {
    key: &'static str,
    value: &'a T,
}

impl<T: Serialize> Serialize for Keyed<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.value)?;
        map.end()
    }
}

// `{"uuids": [...], "<plural>": [...]}`
struct Listed<'a, T> {
    ids: Vec<String>,
    items: &'a [T],
}

impl<T: ApiResource> Serialize for Listed<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(T::ID_LIST, &self.ids)?;
        map.serialize_entry(T::PLURAL, self.items)?;
        map.end()
    }
}

/// Um único objeto: `{"data": {"<singular>": ...}}`.
pub struct Single<T>(pub StatusCode, pub T);

impl<T: ApiResource> Single<T> {
    pub fn ok(value: T) -> Self {
        Single(StatusCode::OK, value)
    }

    pub fn created(value: T) -> Self {
        Single(StatusCode::CREATED, value)
    }
}

impl<T: ApiResource> IntoResponse for Single<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            data: Keyed {
                key: T::SINGULAR,
                value: &self.1,
            },
        };
        (self.0, Json(body)).into_response()
    }
}

/// Uma listagem: `{"data": {"uuids": [...], "<plural>": [...]}}`.
pub struct Listing<T>(pub Vec<T>);

impl<T: ApiResource> IntoResponse for Listing<T> {
    fn into_response(self) -> Response {
        let ids = self.0.iter().map(ApiResource::api_id).collect();
        let body = Envelope {
            data: Listed {
                ids,
                items: &self.0,
            },
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Thing {
        name: String,
    }

    impl ApiResource for Thing {
        const SINGULAR: &'static str = "thing";
        const PLURAL: &'static str = "things";
        const ID_LIST: &'static str = "names";

        fn api_id(&self) -> String {
            self.name.clone()
        }
    }

    #[test]
    fn single_is_keyed_by_singular() {
        let value = serde_json::to_value(Envelope {
            data: Keyed {
                key: Thing::SINGULAR,
                value: &Thing { name: "a".into() },
            },
        })
        .unwrap();
        assert_eq!(value, json!({"data": {"thing": {"name": "a"}}}));
    }

    #[test]
    fn listing_carries_ids_and_items() {
        let items = vec![Thing { name: "a".into() }, Thing { name: "b".into() }];
        let value = serde_json::to_value(Envelope {
            data: Listed {
                ids: items.iter().map(ApiResource::api_id).collect(),
                items: &items,
            },
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"data": {"names": ["a", "b"], "things": [{"name": "a"}, {"name": "b"}]}})
        );
    }
}
