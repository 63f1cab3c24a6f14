use std::sync::Arc;

use thiserror::Error;

use super::camera::Camera;
use super::light::Light;
use super::math::Vec3;
use super::mesh::Mesh;
use super::shader::{FlatShader, PhongShader, ReflectiveShader, Shader};
use super::sphere::Sphere;
use super::world::{Scene, SceneObject};

/// Hand written parser for the scene description format. Statements may
/// appear in any order:
///
/// ```text
/// size 640 480
/// camera from (0,0,5) to (0,0,0)
/// background (0.05,0.1,0.2)
/// ambient white 0.2
/// shadows on
/// depth 4
/// light (4,6,4) white 800
/// sphere (0,0,0) 1 phong: red red white 50
/// mesh "scenes/quad.obj" flat: green
/// ```
///
/// Shaders are written prefix style and nest: `reflective: 0.6 flat: red`.
pub struct SceneParser<'a> {
    content: &'a str,
    buffer: String,
    position: FilePosition,
}

#[derive(Debug, Clone, Copy)]
struct FilePosition {
    line: u32,
    column: u32,
    index: u32,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            index: 0,
        }
    }

    fn on_new_line(self: &mut Self) {
        self.line += 1;
        self.column = 0;
        self.index += 1;
    }

    fn advance(self: &mut Self) {
        self.column += 1;
        self.index += 1;
    }
}

#[derive(Debug, Error)]
#[error("{message} at {line}:{column}")]
pub struct ParseError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    /// Echo the offending line with a caret under the error column.
    pub fn print_error_location(&self, content: &str) {
        eprintln!("{}", self);
        if let Some(line) = content.lines().nth(self.line as usize) {
            eprintln!("{}", line);
            let spacing = " ".repeat(self.column as usize);
            eprintln!("{}^", spacing);
        }
    }
}

type ParserResult<T> = Result<T, ParseError>;

/// Everything a scene file describes: the world and the camera watching it.
pub struct ParsedScene {
    pub camera: Camera,
    pub scene: Scene,
}

impl std::fmt::Debug for ParsedScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedScene").finish_non_exhaustive()
    }
}

impl SceneParser<'_> {
    pub fn new(content: &str) -> SceneParser<'_> {
        SceneParser {
            content,
            position: FilePosition::new(),
            buffer: String::new(),
        }
    }

    fn get_current_char(self: &Self) -> Option<char> {
        self.content.chars().nth(self.position.index as usize)
    }

    fn is_empty(self: &Self) -> bool {
        self.buffer.is_empty() && self.get_current_char().is_none()
    }

    fn advance(self: &mut Self) -> bool {
        if let Some(current_char) = self.get_current_char() {
            if current_char == '\n' {
                self.position.on_new_line();
            } else {
                self.position.advance();
            }
            return true;
        }
        return false;
    }

    fn advance_until(self: &mut Self, f: impl Fn(char) -> bool) {
        while let Some(current_char) = self.get_current_char() {
            if f(current_char) {
                break;
            }
            self.advance();
        }
    }

    fn eat_spaces(self: &mut Self) {
        // consume all the empty lines, spaces and comments before the next token
        while let Some(current_char) = self.get_current_char() {
            if current_char == '#' {
                // consume the characters until the end of the line
                // note: we don't consume the end-of-line here but at the end of the loop
                self.advance_until(|c| c == '\n');
            } else if !current_char.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn pop(self: &mut Self) -> String {
        // check if we already peeked without eating the next token
        if !self.buffer.is_empty() {
            return std::mem::take(&mut self.buffer);
        }

        self.eat_spaces();
        let mut result = String::new();
        if self.get_current_char().is_none() {
            return result;
        }
        let mut current_char = self.get_current_char().unwrap();
        // add the current char to the result string and advance
        let enqueue = move |parser: &mut SceneParser, result: &mut String| {
            if let Some(current_char) = parser.get_current_char() {
                result.push(current_char);
                parser.advance();
            }
            if let Some(next_char) = parser.get_current_char() {
                return next_char;
            }
            return ' ';
        };

        match current_char {
            // single character symbols
            ',' | '(' | ')' | ':' => {
                self.advance();
                result.push(current_char);
            }
            '"' => {
                enqueue(self, &mut result);
                // do not handle escapes, a path never needs them here
                let mut in_string = true;
                loop {
                    // an unterminated string ends at the end of the input;
                    // the caller rejects it for the missing closing quote
                    if self.get_current_char().is_none() {
                        break;
                    }
                    current_char = enqueue(self, &mut result);
                    // eat also the last quote of the string
                    if !in_string {
                        break;
                    }
                    in_string = current_char != '"';
                }
            }
            // float parsing
            '.' | '+' | '-' | '0'..='9' => {
                if current_char == '+' || current_char == '-' {
                    current_char = enqueue(self, &mut result);
                }
                while current_char.is_ascii_digit() {
                    current_char = enqueue(self, &mut result);
                }
                if current_char == '.' {
                    current_char = enqueue(self, &mut result);
                    while current_char.is_ascii_digit() {
                        current_char = enqueue(self, &mut result);
                    }
                }
            }
            _ => {
                while current_char.is_alphabetic() {
                    current_char = enqueue(self, &mut result);
                }
                if result.is_empty() {
                    // stray character: hand it back as its own token so the
                    // caller reports it instead of spinning on it
                    enqueue(self, &mut result);
                }
            }
        }
        return result;
    }

    fn peek(self: &mut Self) -> &String {
        // peek always look ahead and save the result to the buffer
        if self.buffer.is_empty() {
            self.buffer = self.pop();
        }
        return &self.buffer;
    }

    fn error<T>(self: &Self, message: &str) -> ParserResult<T> {
        Err(ParseError {
            message: message.to_string(),
            line: self.position.line,
            column: self.position.column,
        })
    }

    fn parse_float(self: &mut Self) -> ParserResult<f64> {
        let next_token = self.pop();
        if let Ok(num) = next_token.parse::<f64>() {
            Ok(num)
        } else {
            let message = format!("cannot interpret '{}' as a number", next_token);
            self.error(&message)
        }
    }

    fn match_token(self: &mut Self, expected_lexem: &str) -> ParserResult<()> {
        // match primitive: consume a lexem from the stream and if it is
        // different from the expected one raise an error
        let next_lexem = self.pop();
        if next_lexem != expected_lexem {
            let message = format!("expected '{}', got '{}' instead", expected_lexem, next_lexem);
            self.error(&message)
        } else {
            Ok(())
        }
    }

    fn maybe_match(self: &mut Self, expected_lexem: &str) -> bool {
        // variant of match that can fail:
        // if the expected lexem is the next in the stream, consume it and
        // return true. return false otherwise leaving the stream untouched
        let next_lexem = self.peek();
        if *next_lexem == expected_lexem {
            self.pop();
            return true;
        }
        return false;
    }

    fn parse_vec3(self: &mut Self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(self: &mut Self) -> ParserResult<Vec3> {
        // predefined colors, or an explicit triple
        if self.maybe_match("red") {
            Ok(Vec3::new(1.0, 0.0, 0.0))
        } else if self.maybe_match("green") {
            Ok(Vec3::new(0.0, 1.0, 0.0))
        } else if self.maybe_match("blue") {
            Ok(Vec3::new(0.0, 0.0, 1.0))
        } else if self.maybe_match("white") {
            Ok(Vec3::one())
        } else if self.maybe_match("black") {
            Ok(Vec3::zero())
        } else if self.maybe_match("cyan") {
            Ok(Vec3::new(0.0, 1.0, 1.0))
        } else if self.maybe_match("violet") {
            Ok(Vec3::new(1.0, 0.0, 1.0))
        } else if self.maybe_match("yellow") {
            Ok(Vec3::new(1.0, 1.0, 0.0))
        } else if self.maybe_match("orange") {
            Ok(Vec3::new(0.98, 0.45, 0.02))
        } else if self.maybe_match("gray") {
            Ok(Vec3::one() * 0.5)
        } else {
            self.parse_vec3()
        }
    }

    fn parse_string(self: &mut Self) -> ParserResult<String> {
        let next_token = self.pop();
        if next_token.len() < 2 || !next_token.starts_with('"') || !next_token.ends_with('"') {
            let message = format!("expected a quoted string, got '{}' instead", next_token);
            return self.error(&message);
        }
        Ok(next_token[1..next_token.len() - 1].to_string())
    }

    fn parse_shader(self: &mut Self) -> ParserResult<Arc<dyn Shader>> {
        if self.maybe_match("flat") {
            self.match_token(":")?;
            let color = self.parse_color()?;
            Ok(Arc::new(FlatShader { color }))
        } else if self.maybe_match("phong") {
            self.match_token(":")?;
            let color_ambient = self.parse_color()?;
            let color_diffuse = self.parse_color()?;
            let color_specular = self.parse_color()?;
            let specular_power = self.parse_float()?;
            Ok(Arc::new(PhongShader {
                color_ambient,
                color_diffuse,
                color_specular,
                specular_power,
            }))
        } else if self.maybe_match("reflective") {
            self.match_token(":")?;
            let reflectivity = self.parse_float()?;
            let shader = self.parse_shader()?;
            Ok(Arc::new(ReflectiveShader {
                shader,
                reflectivity,
            }))
        } else {
            self.error("expected a shader: one of flat, phong or reflective")
        }
    }

    fn parse_sphere(self: &mut Self) -> ParserResult<SceneObject> {
        self.match_token("sphere")?;
        let center = self.parse_vec3()?;
        let radius = self.parse_float()?;
        let shader = self.parse_shader()?;
        Ok(SceneObject {
            geometry: Box::new(Sphere::new(center, radius)),
            shader,
        })
    }

    fn parse_mesh(self: &mut Self) -> ParserResult<SceneObject> {
        self.match_token("mesh")?;
        let path = self.parse_string()?;
        let shader = self.parse_shader()?;
        let mesh = match Mesh::load(&path) {
            Ok(mesh) => mesh,
            Err(error) => {
                let message = format!("cannot load mesh \"{}\": {}", path, error);
                return self.error(&message);
            }
        };
        Ok(SceneObject {
            geometry: Box::new(mesh),
            shader,
        })
    }

    fn parse_light(self: &mut Self) -> ParserResult<Light> {
        self.match_token("light")?;
        let position = self.parse_vec3()?;
        let color = self.parse_color()?;
        let brightness = self.parse_float()?;
        Ok(Light::new(position, color, brightness))
    }

    fn parse_camera(self: &mut Self) -> ParserResult<Camera> {
        self.match_token("camera")?;
        let mut position = Vec3::zero();
        if self.maybe_match("from") {
            position = self.parse_vec3()?;
        }
        let point = if self.maybe_match("to") {
            self.parse_vec3()?
        } else {
            position + Vec3::z_axis() * -1.0
        };
        Ok(Camera::look_at(position, point))
    }

    fn parse_on_off(self: &mut Self) -> ParserResult<bool> {
        if self.maybe_match("on") {
            Ok(true)
        } else if self.maybe_match("off") {
            Ok(false)
        } else {
            self.error("expected 'on' or 'off'")
        }
    }

    /// Main routine that parses the whole file into a scene and its camera.
    pub fn parse_scene(self: &mut Self) -> ParserResult<ParsedScene> {
        let mut width = 640u32;
        let mut height = 480u32;
        let mut camera: Option<Camera> = None;
        let mut scene = Scene::new();

        while !self.is_empty() {
            let next_token = self.peek().clone();
            match next_token.as_str() {
                "" => break,
                "size" => {
                    self.pop();
                    width = self.parse_float()? as u32;
                    height = self.parse_float()? as u32;
                }
                "camera" => {
                    camera = Some(self.parse_camera()?);
                }
                "background" => {
                    self.pop();
                    let color = self.parse_color()?;
                    scene.background_shader = Arc::new(FlatShader { color });
                }
                "ambient" => {
                    self.pop();
                    scene.ambient_color = self.parse_color()?;
                    scene.ambient_intensity = self.parse_float()?;
                }
                "shadows" => {
                    self.pop();
                    scene.enable_shadows = self.parse_on_off()?;
                }
                "depth" => {
                    self.pop();
                    scene.recursion_depth_limit = self.parse_float()? as u32;
                }
                "light" => {
                    let light = self.parse_light()?;
                    scene.lights.push(light);
                }
                "sphere" => {
                    let object = self.parse_sphere()?;
                    scene.objects.push(object);
                }
                "mesh" => {
                    let object = self.parse_mesh()?;
                    scene.objects.push(object);
                }
                _ => {
                    let message = format!("unexpected token '{}'", next_token);
                    return self.error(&message);
                }
            }
        }

        let mut camera = camera.unwrap_or_else(Camera::default_view);
        camera.set_resolution(width, height);
        Ok(ParsedScene { camera, scene })
    }
}
