#![allow(dead_code)]

//! Shared JSON wire-format fixture.
//!
//! Conventions: records encode as objects, tuples as arrays, sum cases as
//! `["Tag", payload...]`, payload-free enumerated sums as bare tag strings.

use serde_json::Value as Json;
use stencil_engine::{
    Checker, Code, Decoder, Derive, EncodedField, Encoder, EvalError, EvalResult, Linked,
    MatchDecoder, Pat, Value,
};
use stencil_reflect::raw::RawDecl;

pub fn to_json() -> Encoder {
    Encoder::new("to_json")
        .rep("json")
        .tuple(|elems| Code::call("json.arr", elems.to_vec()))
        .record(|fields| Code::call("json.obj", obj_entries(fields)))
        .case_tuple(|ctx, args| {
            let mut elems = vec![Code::call("json.str", vec![Code::str(ctx.tag)])];
            elems.extend(args.iter().cloned());
            Code::call("json.arr", elems)
        })
        .case_record(|ctx, fields| {
            Code::call(
                "json.arr",
                vec![
                    Code::call("json.str", vec![Code::str(ctx.tag)]),
                    Code::call("json.obj", obj_entries(fields)),
                ],
            )
        })
        .enum_case(|ctx| Code::call("json.str", vec![Code::str(ctx.tag)]))
        .poly_case(|ctx, args| {
            let mut elems = vec![Code::call("json.str", vec![Code::str(ctx.tag)])];
            elems.extend(args.iter().cloned());
            Code::call("json.arr", elems)
        })
        .enum_poly_case(|ctx| Code::call("json.str", vec![Code::str(ctx.tag)]))
}

fn obj_entries(fields: &[EncodedField]) -> Vec<Code> {
    fields
        .iter()
        .map(|field| Code::tuple(vec![Code::str(field.name), field.code.clone()]))
        .collect()
}

pub fn of_json() -> Decoder {
    Decoder::new("of_json")
        .rep("json")
        .tuple(|input, elems| {
            Code::tuple(
                elems
                    .iter()
                    .enumerate()
                    .map(|(i, dec)| decode_nth(dec, &input, i as i64))
                    .collect(),
            )
        })
        .record(|input, fields| {
            Code::record(
                fields
                    .iter()
                    .map(|field| {
                        (
                            field.name.to_string(),
                            decode_get(&field.decoder, &input, field.name),
                        )
                    })
                    .collect(),
            )
        })
        .case(|site, input| {
            use stencil_engine::DecodePayload;
            let value = match &site.payload {
                DecodePayload::Tuple(decoders) => Code::case(
                    site.tag,
                    decoders
                        .iter()
                        .enumerate()
                        .map(|(i, dec)| decode_nth(dec, &input, i as i64 + 1))
                        .collect(),
                ),
                DecodePayload::Record(fields) => Code::case_record(
                    site.tag,
                    fields
                        .iter()
                        .map(|field| {
                            (
                                field.name.to_string(),
                                decode_get(
                                    &field.decoder,
                                    &Code::call(
                                        "json.nth",
                                        vec![input.clone(), Code::int(1)],
                                    ),
                                    field.name,
                                ),
                            )
                        })
                        .collect(),
                ),
            };
            attempt_tagged(site.tag, &input, value)
        })
        .enum_case(|ctx, input| attempt_tagged(ctx.tag, &input, Code::case(ctx.tag, vec![])))
        .poly_case(|site, input| {
            let value = Code::poly(
                site.tag,
                site.args
                    .iter()
                    .enumerate()
                    .map(|(i, dec)| decode_nth(dec, &input, i as i64 + 1))
                    .collect(),
            );
            attempt_tagged(site.tag, &input, value)
        })
        .enum_poly_case(|ctx, input| attempt_tagged(ctx.tag, &input, Code::poly(ctx.tag, vec![])))
}

pub fn of_json_by_match() -> MatchDecoder {
    MatchDecoder::new("of_json")
        .rep("json")
        .scrutinee(|input| Code::call("json.tag", vec![input]))
        .tuple(|input, elems| {
            Code::tuple(
                elems
                    .iter()
                    .enumerate()
                    .map(|(i, dec)| decode_nth(dec, &input, i as i64))
                    .collect(),
            )
        })
        .record(|input, fields| {
            Code::record(
                fields
                    .iter()
                    .map(|field| {
                        (
                            field.name.to_string(),
                            decode_get(&field.decoder, &input, field.name),
                        )
                    })
                    .collect(),
            )
        })
        .case_arm(|site, input| {
            use stencil_engine::DecodePayload;
            let value = match &site.payload {
                DecodePayload::Tuple(decoders) => Code::case(
                    site.tag,
                    decoders
                        .iter()
                        .enumerate()
                        .map(|(i, dec)| decode_nth(dec, &input, i as i64 + 1))
                        .collect(),
                ),
                DecodePayload::Record(fields) => Code::case_record(
                    site.tag,
                    fields
                        .iter()
                        .map(|field| {
                            (
                                field.name.to_string(),
                                decode_get(
                                    &field.decoder,
                                    &Code::call(
                                        "json.nth",
                                        vec![input.clone(), Code::int(1)],
                                    ),
                                    field.name,
                                ),
                            )
                        })
                        .collect(),
                ),
            };
            (Pat::str(site.tag), value)
        })
        .enum_case_arm(|ctx| (Pat::str(ctx.tag), Code::case(ctx.tag, vec![])))
        .poly_arm(|site, input| {
            let value = Code::poly(
                site.tag,
                site.args
                    .iter()
                    .enumerate()
                    .map(|(i, dec)| decode_nth(dec, &input, i as i64 + 1))
                    .collect(),
            );
            (Pat::str(site.tag), value)
        })
}

fn decode_nth(decoder: &Code, input: &Code, index: i64) -> Code {
    Code::apply(
        decoder.clone(),
        vec![Code::call(
            "json.nth",
            vec![input.clone(), Code::int(index)],
        )],
    )
}

fn decode_get(decoder: &Code, input: &Code, field: &str) -> Code {
    Code::apply(
        decoder.clone(),
        vec![Code::call(
            "json.get",
            vec![input.clone(), Code::str(field)],
        )],
    )
}

fn attempt_tagged(tag: &str, input: &Code, value: Code) -> Code {
    Code::if_(
        Code::call("json.is_tag", vec![input.clone(), Code::str(tag)]),
        Code::some(value),
        Code::none(),
    )
}

fn native_json(value: &Value) -> EvalResult<Json> {
    value.as_json().cloned()
}

fn tag_of(json: &Json) -> Option<&str> {
    match json {
        Json::String(tag) => Some(tag),
        Json::Array(elems) => match elems.first() {
            Some(Json::String(tag)) => Some(tag),
            _ => None,
        },
        _ => None,
    }
}

/// A checker preloaded with the JSON natives and leaf codecs.
pub fn checker() -> Checker {
    Checker::new()
        .native("json.arr", |args| {
            let elems = args.iter().map(native_json).collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::Json(Json::Array(elems)))
        })
        .native("json.obj", |args| {
            let mut map = serde_json::Map::new();
            for arg in args {
                match arg {
                    Value::Tuple(pair) if pair.len() == 2 => match &pair[0] {
                        Value::Str(name) => {
                            map.insert(name.clone(), native_json(&pair[1])?);
                        }
                        other => {
                            return Err(EvalError::Type(format!(
                                "object key must be a string, got {other:?}"
                            )))
                        }
                    },
                    other => {
                        return Err(EvalError::Type(format!(
                            "object entry must be a pair, got {other:?}"
                        )))
                    }
                }
            }
            Ok(Value::Json(Json::Object(map)))
        })
        .native("json.str", |args| match &args[0] {
            Value::Str(s) => Ok(Value::Json(Json::String(s.clone()))),
            other => Err(EvalError::Type(format!("expected a string, got {other:?}"))),
        })
        .native("json.get", |args| {
            let obj = args[0].as_json()?;
            let Value::Str(key) = &args[1] else {
                return Err(EvalError::Type("field name must be a string".to_string()));
            };
            obj.get(key)
                .cloned()
                .map(Value::Json)
                .ok_or_else(|| EvalError::Decode(format!("missing field '{key}'")))
        })
        .native("json.nth", |args| {
            let arr = args[0].as_json()?;
            let Value::Int(index) = &args[1] else {
                return Err(EvalError::Type("index must be an int".to_string()));
            };
            arr.get(*index as usize)
                .cloned()
                .map(Value::Json)
                .ok_or_else(|| EvalError::Decode(format!("missing element {index}")))
        })
        .native("json.tag", |args| {
            let json = args[0].as_json()?;
            tag_of(json)
                .map(Value::str)
                .ok_or_else(|| EvalError::Decode("value carries no tag".to_string()))
        })
        .native("json.is_tag", |args| {
            let json = args[0].as_json()?;
            let Value::Str(tag) = &args[1] else {
                return Err(EvalError::Type("tag must be a string".to_string()));
            };
            Ok(Value::Bool(tag_of(json) == Some(tag.as_str())))
        })
        .native("to_json_int", |args| match &args[0] {
            Value::Int(n) => Ok(Value::Json(Json::from(*n))),
            other => Err(EvalError::Type(format!("expected an int, got {other:?}"))),
        })
        .native("of_json_int", |args| {
            args[0]
                .as_json()?
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| EvalError::Decode("expected a json number".to_string()))
        })
        .native("to_json_string", |args| match &args[0] {
            Value::Str(s) => Ok(Value::Json(Json::String(s.clone()))),
            other => Err(EvalError::Type(format!("expected a string, got {other:?}"))),
        })
        .native("of_json_string", |args| match args[0].as_json()? {
            Json::String(s) => Ok(Value::str(s.clone())),
            _ => Err(EvalError::Decode("expected a json string".to_string())),
        })
        .global("default_int", Value::Int(0))
        .global("default_string", Value::str(""))
}

/// Derive a batch and link the generated units against the JSON natives.
pub fn derive_and_link(derivation: &impl Derive, decls: &[RawDecl]) -> Linked {
    let items = derivation.derive_batch(decls).expect("derivation failed");
    checker().link(&items).expect("linking failed")
}
