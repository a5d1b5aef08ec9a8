/// 內建範例專案。 / A built-in sample project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub text: &'static str,
}

const PYTHON_SAMPLE: &str = r#"//--- main.py ---
from utils.greet import greet

name = input("Your name")
times = int(input("How many times"))
for _ in range(times):
    print(greet(name))

//--- utils/greet.py ---
def greet(name):
    return f"Hello, {name}!"
"#;

const C_SAMPLE: &str = r#"//--- main.c ---
#include <stdio.h>

// input("Width")
// input("Height")
int main(void) {
    int width = 0, height = 0;
    scanf("%d %d", &width, &height);
    printf("Area: %d\n", width * height);
    return 0;
}
"#;

const WEB_SAMPLE: &str = r#"//--- index.html ---
<!DOCTYPE html>
<html>
<head>
  <title>Counter</title>
  <link rel="stylesheet" href="css/style.css">
</head>
<body>
  <button id="counter">Clicked 0 times</button>
  <script src="js/app.js"></script>
</body>
</html>

//--- css/style.css ---
body { font-family: sans-serif; display: grid; place-items: center; height: 100vh; }
button { font-size: 1.5rem; padding: 0.5rem 1rem; }

//--- js/app.js ---
let clicks = 0;
const button = document.getElementById("counter");
button.addEventListener("click", () => {
  clicks += 1;
  button.textContent = `Clicked ${clicks} times`;
});
"#;

/// 依載入順序排列的範例。 / Samples in cycle order.
pub const SAMPLES: [Sample; 3] = [
    Sample {
        name: "Python",
        text: PYTHON_SAMPLE,
    },
    Sample {
        name: "C",
        text: C_SAMPLE,
    },
    Sample {
        name: "Web",
        text: WEB_SAMPLE,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use pastepad_project::{parse, LanguageDetector, LanguageTag};

    #[test]
    fn every_sample_parses_to_its_language() {
        let expected = [LanguageTag::Python, LanguageTag::C, LanguageTag::Web];
        for (sample, language) in SAMPLES.iter().zip(expected) {
            let files = parse(sample.text).unwrap();
            assert_eq!(LanguageDetector::detect(&files), language, "{}", sample.name);
        }
    }
}
