//! Java sources used as repository content

pub const FOO_BUILDER: &str = "package acme;\n\npublic class FooBuilder {\n    private String name;\n\n    public FooBuilder name(String name) {\n        this.name = name;\n        return this;\n    }\n\n    public Foo build() {\n        return new Foo(name);\n    }\n}\n";

pub const UTIL: &str = "package acme;\n\npublic final class Util {\n    private Util() {}\n\n    public static int twice(int x) {\n        return 2 * x;\n    }\n}\n";

pub const TRAFFIC_STATE: &str = "package acme;\n\npublic interface TrafficLightState {\n    TrafficLightState next();\n}\n";

/// Would be a Builder, but mentions a test keyword
pub const BUILDER_TEST: &str = "package acme;\n\nimport org.junit.Test;\n\npublic class FooBuilderTest {\n    @Test\n    public void builds() {}\n}\n";

/// A Builder saved as Latin-1, so not valid UTF-8
pub const LATIN1_BUILDER: &[u8] = b"public class CafeBuilder { // caf\xE9 }\n";

pub const README: &str = "# acme\n\npublic class ReadmeBuilder is not Java\n";
