//! Lenient YAML document stream decoding into `serde_json::Value` trees.
//!
//! Builds the tree directly from the YAML event stream instead of going
//! through `serde_yaml::Value`, so that duplicate mapping keys resolve to the
//! last occurrence and scalar keys of any type are accepted. Local tags such
//! as CloudFormation's `!Ref` or `!GetAtt` become their long-form objects.

use serde::de::{self, DeserializeSeed, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Decode every document of a YAML stream, keeping empty documents as `Null`
/// so that positions stay stable.
pub fn parse_documents(content: &str) -> Result<Vec<Value>, serde_yaml::Error> {
    serde_yaml::Deserializer::from_str(content)
        .map(|document| JsonTree::deserialize(document).map(|tree| tree.0))
        .collect()
}

/// A JSON tree decoded from any self-describing format.
struct JsonTree(Value);

impl<'de> Deserialize<'de> for JsonTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TreeVisitor).map(JsonTree)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        // .nan and .inf have no JSON number form
        Ok(Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(v.to_string())))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonTree::deserialize(deserializer).map(|tree| tree.0)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(JsonTree(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut object = Map::new();
        while let Some(key) = map.next_key_seed(KeySeed)? {
            let JsonTree(value) = map.next_value()?;
            // last duplicate wins
            object.insert(key, value);
        }
        Ok(Value::Object(object))
    }

    fn visit_enum<A>(self, data: A) -> Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, variant): (String, _) = data.variant()?;
        let JsonTree(value) = variant.newtype_variant()?;
        Ok(expand_tag(&tag, value))
    }
}

/// Mapping keys are stringified scalars.
struct KeySeed;

impl<'de> DeserializeSeed<'de> for KeySeed {
    type Value = String;

    fn deserialize<D>(self, deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyVisitor)
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar mapping key")
    }

    fn visit_bool<E>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_str<E>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_unit<E>(self) -> Result<String, E> {
        Ok("null".to_owned())
    }

    fn visit_enum<A>(self, data: A) -> Result<String, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (_, variant): (String, _) = data.variant()?;
        variant.newtype_variant_seed(KeySeed)
    }

    fn visit_seq<A>(self, _seq: A) -> Result<String, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Err(de::Error::custom("sequences cannot be used as mapping keys"))
    }

    fn visit_map<A>(self, _map: A) -> Result<String, A::Error>
    where
        A: MapAccess<'de>,
    {
        Err(de::Error::custom("mappings cannot be used as mapping keys"))
    }
}

/// Expand a local tag into the long-form object CloudFormation expects.
fn expand_tag(tag: &str, value: Value) -> Value {
    let name = tag.trim_start_matches('!');
    let (key, value) = match name {
        "Ref" | "Condition" => (name.to_owned(), value),
        "GetAtt" => (format!("Fn::{name}"), split_get_att(value)),
        _ => (format!("Fn::{name}"), value),
    };
    let mut object = Map::new();
    object.insert(key, value);
    Value::Object(object)
}

fn split_get_att(value: Value) -> Value {
    match value {
        Value::String(s) => match s.split_once('.') {
            Some((resource, attribute)) => Value::Array(vec![
                Value::String(resource.to_owned()),
                Value::String(attribute.to_owned()),
            ]),
            None => Value::String(s),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_multiple_documents_keep_positions() {
        let docs = parse_documents("a: 1\n---\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0], json!({"a": 1}));
        assert!(docs[1].is_null());
        assert_eq!(docs[2], json!({"b": 2}));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let content = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: myapp-pod\nspec:\n  containers:\n  something: here\nmetadata:\n  another: thing\n";
        let docs = parse_documents(content).unwrap();
        assert_eq!(
            docs[0],
            json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {"another": "thing"},
                "spec": {"containers": null, "something": "here"}
            })
        );
    }

    #[test]
    fn test_insufficient_flow_indentation() {
        let content = r#"
Resources:
 Denied:
   Type: "AWS::IAM::Role"
   Properties:
     AssumeRolePolicyDocument: {
 "Version": "2012-10-17",
 "Statement": [
   {
     "Action": "sts:AssumeRole",
     "Effect": "Allow",
     "Sid": ""
   }
 ]
}
"#;
        let docs = parse_documents(content).unwrap();
        assert_eq!(
            docs[0]["Resources"]["Denied"]["Properties"]["AssumeRolePolicyDocument"]["Statement"]
                [0]["Action"],
            "sts:AssumeRole"
        );
    }

    #[test]
    fn test_non_string_keys() {
        let docs = parse_documents("80: http\ntrue: yes\n").unwrap();
        assert_eq!(docs[0]["80"], "http");
        assert_eq!(docs[0]["true"], "yes");
    }

    #[test]
    fn test_cloudformation_short_tags() {
        let content = "Resources:\n  Bucket:\n    Properties:\n      BucketName: !Ref Name\n      Arn: !GetAtt Role.Arn\n      Joined: !Join [\"-\", [a, b]]\n";
        let docs = parse_documents(content).unwrap();
        let props = &docs[0]["Resources"]["Bucket"]["Properties"];
        assert_eq!(props["BucketName"], json!({"Ref": "Name"}));
        assert_eq!(props["Arn"], json!({"Fn::GetAtt": ["Role", "Arn"]}));
        assert_eq!(props["Joined"], json!({"Fn::Join": ["-", ["a", "b"]]}));
    }

    #[test]
    fn test_json_is_accepted() {
        let docs = parse_documents(r#"{"kind": "Pod", "spec": {"replicas": 2}}"#).unwrap();
        assert_eq!(docs[0]["spec"]["replicas"], 2);
    }

    #[test]
    fn test_syntax_error() {
        assert!(parse_documents("a: [1, 2\nb: c").is_err());
    }
}
