//! Sample configuration resources.
//!
//! Every fixture describes the same `MYOBJECT` category:
//! `myattr = "myvalue"`, `six = 6` and `twelve = =@six * 2.0`.

pub const MYOBJECT_INI: &str = "\
[MYOBJECT]
myattr = myvalue
six = 6
six::type = int
twelve = =@six * 2.0
";

pub const MYOBJECT_JSON: &str = r#"{
  "MYOBJECT": {
    "myattr": "myvalue",
    "six": 6,
    "twelve": "=@six * 2.0"
  }
}
"#;

pub const MYOBJECT_TOML: &str = r#"[MYOBJECT]
myattr = "myvalue"
six = 6
twelve = "=@six * 2.0"
"#;

pub const MYOBJECT_YAML: &str = "\
MYOBJECT:
  myattr: myvalue
  six: 6
  twelve: =@six * 2.0
";

pub const MYOBJECT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<configuration>
  <category name="MYOBJECT">
    <parameter name="myattr" value="myvalue"/>
    <parameter name="six" value="6" type="int"/>
    <parameter name="twelve" value="=@six * 2.0"/>
  </category>
</configuration>
"#;

/// `(file name, content)` for every fixture.
pub fn all() -> [(&'static str, &'static str); 5] {
    [
        ("myobject.ini", MYOBJECT_INI),
        ("myobject.json", MYOBJECT_JSON),
        ("myobject.toml", MYOBJECT_TOML),
        ("myobject.yaml", MYOBJECT_YAML),
        ("myobject.xml", MYOBJECT_XML),
    ]
}
