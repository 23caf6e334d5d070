/// Two documents sharing namespace `n1` and both defining `q1`; `a_first.xml`
/// sorts before `b_second.xml` and is registered first.
pub const N1_FIRST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<conditions namespace="n1">
    <condition id="q1">
        <equal field="status" value="shipped"/>
    </condition>
    <condition id="q3">first only</condition>
</conditions>"#;

pub const N1_SECOND: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<conditions namespace="n1">
    <condition id="q1">
        <notEqual field="status" value="cancelled"/>
    </condition>
    <condition id="q4">second only</condition>
</conditions>"#;

/// A document declaring a default namespace URI.
pub const QUALIFIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<conditions xmlns="http://example.com/ns" namespace="n2">
    <condition id="q2">
        <between field="total" start="10" end="100"/>
        <include refId="q1"/>
    </condition>
</conditions>"#;

/// A document the loader must ignore.
pub const UNRELATED: &str = r#"<settings namespace="n1"><condition id="q1"/></settings>"#;

pub const MALFORMED: &str = r#"<conditions namespace="n1"><condition id="q1">"#;

pub fn n1_q9(text: &str) -> String {
    format!(r#"<conditions namespace="n1"><condition id="q9">{text}</condition></conditions>"#)
}
