use mint::{parse, EvaluationContext, MintValue, WriterChannel};

const PROGRAM: &str = "
function make_counter() {
    let count = 0;

    function counter() {
        count = count + 1;
        return count;
    }

    return counter;
}
";

fn main() -> anyhow::Result<()> {
    // Printed values go straight to stdout
    let mut context = EvaluationContext::new(WriterChannel::stdout());
    context.evaluate_str(PROGRAM)?;
    context.evaluate_str("let count = make_counter();")?;
    for _ in 0..5 {
        context.evaluate_str("print count();")?;
    }

    // Or are collected, from a program parsed ahead of time
    let program = parse("let other = make_counter(); print other(); print count();")?;
    let mut collected = EvaluationContext::new(Vec::<MintValue>::new());
    collected.evaluate_str(PROGRAM)?;
    collected.evaluate_str("let count = make_counter();")?;
    collected.execute(&program)?;
    println!("collected: {:?}", collected.output());

    Ok(())
}
