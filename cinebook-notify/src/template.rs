use cinebook_core::BookingConfirmation;

/// Subject and bodies of a booking confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn render(confirmation: &BookingConfirmation) -> RenderedEmail {
    let movie = &confirmation.movie.name;
    let theater = &confirmation.showing.theater;
    let show_date = confirmation.showing.starts_at.format("%A, %B %-d %Y").to_string();
    let show_time = confirmation.showing.starts_at.format("%H:%M UTC").to_string();
    let seats = confirmation.seats.join(", ");
    let greeting = confirmation
        .customer
        .name
        .as_deref()
        .map(|name| format!("Hi {},", name))
        .unwrap_or_else(|| "Hi,".to_string());

    let subject = format!("Your booking confirmation for {}", movie);

    let text = format!(
        "{greeting}\n\n\
         Your booking is confirmed.\n\n\
         Movie:   {movie}\n\
         Theater: {theater}\n\
         Date:    {show_date}\n\
         Time:    {show_time}\n\
         Seats:   {seats}\n\n\
         Please arrive a few minutes before the show starts.\n"
    );

    let seat_items: String = confirmation
        .seats
        .iter()
        .map(|s| format!("<li>{}</li>", escape(s)))
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <p>{greeting}</p>
        <h2 style="color: #b91c1c;">{movie}</h2>
        <p>Your booking is confirmed.</p>
        <table>
            <tr><td><strong>Theater</strong></td><td>{theater}</td></tr>
            <tr><td><strong>Date</strong></td><td>{show_date}</td></tr>
            <tr><td><strong>Time</strong></td><td>{show_time}</td></tr>
        </table>
        <p><strong>Seats</strong></p>
        <ul>{seat_items}</ul>
        <p style="color: #666; font-size: 14px;">Please arrive a few minutes before the show starts.</p>
    </div>
</body>
</html>
"#,
        title = escape(&subject),
        greeting = escape(&greeting),
        movie = escape(movie),
        theater = escape(theater),
        show_date = show_date,
        show_time = show_time,
        seat_items = seat_items,
    );

    RenderedEmail { subject, text, html }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
