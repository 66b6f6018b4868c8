//! Embedded HTML/CSS/JS frontend for the plotwise chat page.
//!
//! The entire page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. All render
//! models (bubbles, charts, tables) arrive prebuilt from the API; the
//! scripts here only paint them.

/// The complete single-page chat client HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>plotwise</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app {
  max-width: 900px;
  margin: 0 auto;
  padding: 24px;
  display: flex;
  flex-direction: column;
  height: 100vh;
}

header {
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
  margin-bottom: 16px;
}
header h1 { font-size: 20px; font-weight: 600; }
.subtitle {
  color: var(--text-muted);
  font-size: 12px;
  margin-top: 4px;
  white-space: nowrap;
  overflow: hidden;
  text-overflow: ellipsis;
}

/* Transcript */
.chat {
  flex: 1;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  overflow-y: auto;
  margin-bottom: 16px;
  min-height: 240px;
}

.msg { display: flex; margin-bottom: 14px; }
.msg.user { justify-content: flex-end; }
.msg.bot { justify-content: flex-start; }

.bubble {
  max-width: 78%;
  padding: 10px 14px;
  border-radius: var(--radius);
}
.msg.user .bubble {
  background: var(--accent);
  color: #fff;
  border-bottom-right-radius: 2px;
}
.msg.bot .bubble {
  background: var(--bg);
  border: 1px solid var(--border);
  border-bottom-left-radius: 2px;
  max-width: 92%;
}
.bubble .who {
  font-weight: 600;
  font-size: 12px;
  margin-bottom: 4px;
}
.bubble .text { white-space: pre-wrap; word-break: break-word; }
.bubble .meta {
  font-size: 11px;
  margin-top: 6px;
  opacity: 0.7;
  text-align: right;
}

/* Chart and table panels inside bot bubbles */
.panel-card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 12px;
  margin-top: 10px;
}
.chart-title { font-size: 13px; font-weight: 600; margin-bottom: 8px; }
.chart-svg { width: 100%; height: auto; display: block; }
.chart-svg .axis { stroke: var(--border); stroke-width: 1; }
.chart-svg .tick { fill: var(--text-muted); font-size: 11px; }

.legend {
  display: flex;
  flex-wrap: wrap;
  gap: 12px;
  margin-top: 8px;
  font-size: 12px;
  color: var(--text-muted);
}
.legend .key { display: inline-flex; align-items: center; gap: 5px; }
.legend .key i {
  width: 10px;
  height: 10px;
  border-radius: 3px;
  display: inline-block;
}

/* Tables */
.table-wrap { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; }
th {
  text-align: left;
  padding: 8px 10px;
  font-size: 11px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.5px;
  color: var(--text-muted);
  border-bottom: 1px solid var(--border);
  white-space: nowrap;
}
td {
  padding: 8px 10px;
  border-bottom: 1px solid var(--border);
  font-family: var(--mono);
  font-size: 13px;
  white-space: nowrap;
}
tr:last-child td { border-bottom: none; }
tr:hover td { background: rgba(255, 255, 255, 0.02); }

/* Buttons */
.btn {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: 6px;
  padding: 8px 16px;
  font-size: 13px;
  cursor: pointer;
  font-family: var(--font);
}
.btn:hover { border-color: var(--accent); }
.btn:disabled { opacity: 0.5; cursor: default; }
.btn.primary {
  background: var(--accent);
  border-color: var(--accent);
  color: #fff;
}
.btn.export { padding: 5px 12px; font-size: 12px; }
.btn-group { display: flex; gap: 8px; margin-top: 10px; }

/* Input row */
.input-row { display: flex; gap: 8px; }
.input-row input {
  flex: 1;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--text);
  padding: 10px 14px;
  font-size: 14px;
  font-family: var(--font);
}
.input-row input:focus { outline: none; border-color: var(--accent); }
.input-row input:disabled { opacity: 0.6; }

/* Empty transcript */
.empty {
  text-align: center;
  color: var(--text-muted);
  padding: 60px 16px;
}
.empty h2 { font-size: 22px; color: var(--text); margin-bottom: 8px; }
.empty .examples { color: var(--accent); font-size: 13px; margin-top: 6px; }

/* Toast */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 12px 20px;
  font-size: 13px;
  opacity: 0;
  transition: opacity 0.3s;
  pointer-events: none;
  z-index: 100;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); color: var(--red); }

/* Spinner */
.spinner {
  display: inline-block;
  width: 12px;
  height: 12px;
  border: 2px solid var(--border);
  border-top-color: #fff;
  border-radius: 50%;
  animation: spin 0.6s linear infinite;
  margin-right: 6px;
  vertical-align: -2px;
}
@keyframes spin { to { transform: rotate(360deg); } }

@media (max-width: 768px) {
  .app { padding: 12px; }
  .bubble { max-width: 92%; }
}
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>🏠 Real Estate Analysis Chatbot</h1>
    <div class="subtitle" id="localities"></div>
  </header>

  <div class="chat" id="chat"></div>

  <form class="input-row" id="input-row">
    <input type="text" id="query" placeholder="Ask something... (e.g., 'Analyze Wakad' or 'Compare Aundh and Akurdi')" autocomplete="off">
    <button class="btn primary" id="send-btn" type="submit">Send</button>
  </form>
</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

let state = null;
let sending = false;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function esc(s) {
  return String(s)
    .replace(/&/g, '&amp;')
    .replace(/</g, '&lt;')
    .replace(/>/g, '&gt;')
    .replace(/"/g, '&quot;');
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => { el.className = 'toast'; }, 3000);
}

// ---------------------------------------------------------------------------
// Chart painter
// ---------------------------------------------------------------------------

function segments(data) {
  const out = [];
  let run = [];
  data.forEach((v, i) => {
    if (v === null) {
      if (run.length) { out.push(run); run = []; }
    } else {
      run.push([i, v]);
    }
  });
  if (run.length) out.push(run);
  return out;
}

function renderChart(c) {
  const W = 640, H = 300, padT = 30, padB = 40;
  const padL = 46, padR = c.y2_title ? 46 : 16;
  const plotW = W - padL - padR, plotH = H - padT - padB;
  const n = c.labels.length;
  const x = i => padL + (n > 1 ? (i / (n - 1)) * plotW : plotW / 2);

  // One scale per axis, zero-based so magnitudes stay comparable
  const scale = axis => {
    let max = 0;
    c.series.filter(s => s.axis === axis).forEach(s =>
      s.data.forEach(v => { if (v !== null && v > max) max = v; }));
    if (max === 0) max = 1;
    return v => padT + plotH - (v / max) * plotH;
  };
  const y1 = scale('primary'), y2 = scale('secondary');
  const base = H - padB;

  const paths = c.series.map(s => {
    const sy = s.axis === 'secondary' ? y2 : y1;
    const runs = segments(s.data);
    const line = runs.map(run =>
      'M' + run.map(p => x(p[0]).toFixed(1) + ' ' + sy(p[1]).toFixed(1)).join(' L')
    ).join(' ');
    let area = '';
    if (s.fill) {
      area = runs.filter(run => run.length > 1).map(run => {
        const first = run[0][0], last = run[run.length - 1][0];
        return 'M' + x(first).toFixed(1) + ' ' + base +
          ' L' + run.map(p => x(p[0]).toFixed(1) + ' ' + sy(p[1]).toFixed(1)).join(' L') +
          ' L' + x(last).toFixed(1) + ' ' + base + ' Z';
      }).join(' ');
    }
    const dots = runs.flat().map(p =>
      '<circle cx="' + x(p[0]).toFixed(1) + '" cy="' + sy(p[1]).toFixed(1) +
      '" r="3" fill="' + s.border_color + '"/>'
    ).join('');
    return (area ? '<path d="' + area + '" fill="' + s.background_color + '" stroke="none"/>' : '') +
      (line ? '<path d="' + line + '" fill="none" stroke="' + s.border_color + '" stroke-width="2"/>' : '') +
      dots;
  }).join('');

  const xLabels = c.labels.map((l, i) =>
    '<text x="' + x(i).toFixed(1) + '" y="' + (base + 16) +
    '" text-anchor="middle" class="tick">' + esc(l) + '</text>'
  ).join('');

  const legend = c.series.map(s =>
    '<span class="key"><i style="background:' + s.border_color + '"></i>' + esc(s.label) + '</span>'
  ).join('');

  const y2Parts = c.y2_title
    ? '<line x1="' + (W - padR) + '" y1="' + padT + '" x2="' + (W - padR) + '" y2="' + base + '" class="axis"/>' +
      '<text x="' + (W - padR) + '" y="' + (padT - 10) + '" text-anchor="end" class="tick">' + esc(c.y2_title) + '</text>'
    : '';

  return `
    <div class="panel-card">
      <div class="chart-title">${esc(c.title)}</div>
      <svg viewBox="0 0 ${W} ${H}" class="chart-svg" role="img">
        <line x1="${padL}" y1="${padT}" x2="${padL}" y2="${base}" class="axis"/>
        <line x1="${padL}" y1="${base}" x2="${W - padR}" y2="${base}" class="axis"/>
        ${y2Parts}
        ${paths}
        ${xLabels}
        <text x="${padL}" y="${padT - 10}" class="tick">${esc(c.y_title)}</text>
        <text x="${(padL + W - padR) / 2}" y="${H - 6}" text-anchor="middle" class="tick">${esc(c.x_title)}</text>
      </svg>
      <div class="legend">${legend}</div>
    </div>`;
}

// ---------------------------------------------------------------------------
// Table painter
// ---------------------------------------------------------------------------

function renderTable(m) {
  const t = m.table;
  const head = t.columns.map(c => `<th>${esc(c.title)}</th>`).join('');
  const body = t.rows.map(r =>
    `<tr>${r.map(cell => `<td>${esc(cell)}</td>`).join('')}</tr>`
  ).join('');
  const exports = m.exports.map(f =>
    `<button class="btn export" data-id="${m.id}" data-format="${f}"
      title="Download as ${f.toUpperCase()}">📥 ${f.toUpperCase()}</button>`
  ).join('');
  return `
    <div class="panel-card">
      <div class="table-wrap">
        <table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table>
      </div>
      <div class="btn-group">${exports}</div>
    </div>`;
}

// ---------------------------------------------------------------------------
// Transcript rendering
// ---------------------------------------------------------------------------

function renderMessage(m) {
  const who = m.role === 'user' ? 'You' : '🤖 Bot';
  const panels =
    (m.chart ? renderChart(m.chart) : '') +
    (m.table ? renderTable(m) : '');
  return `
    <div class="msg ${m.role}">
      <div class="bubble">
        <div class="who">${who}</div>
        <div class="text">${esc(m.text)}</div>
        ${panels}
        <div class="meta">${m.time}</div>
      </div>
    </div>`;
}

function render() {
  const chat = document.getElementById('chat');
  const strip = document.getElementById('localities');

  strip.textContent = state.localities.length
    ? 'Available: ' + state.localities.join(', ')
    : '';

  if (state.intro) {
    chat.innerHTML = `
      <div class="empty">
        <h2>${esc(state.intro.heading)}</h2>
        <p>${esc(state.intro.hint)}</p>
        <p class="examples">${esc(state.intro.examples)}</p>
      </div>`;
  } else {
    chat.innerHTML = state.messages.map(renderMessage).join('');
  }

  chat.scrollTop = chat.scrollHeight;
}

// ---------------------------------------------------------------------------
// Sending
// ---------------------------------------------------------------------------

function setSending(on) {
  sending = on;
  const input = document.getElementById('query');
  const btn = document.getElementById('send-btn');
  input.disabled = on;
  btn.disabled = on;
  btn.innerHTML = on ? '<span class="spinner"></span>Sending...' : 'Send';
  if (!on) input.focus();
}

document.getElementById('input-row').addEventListener('submit', async e => {
  e.preventDefault();
  const input = document.getElementById('query');
  const text = input.value.trim();
  if (!text || sending) return;
  input.value = '';

  // Echo the user's bubble immediately; the server state replaces it
  const chat = document.getElementById('chat');
  if (state && state.intro) chat.innerHTML = '';
  chat.insertAdjacentHTML('beforeend',
    `<div class="msg user"><div class="bubble"><div class="who">You</div><div class="text">${esc(text)}</div></div></div>`);
  chat.scrollTop = chat.scrollHeight;

  setSending(true);
  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ query: text }),
    });
    const data = await res.json();
    if (!res.ok) {
      toast(data.error || 'Failed to process query', true);
    } else {
      state = data;
      render();
    }
  } catch (e) {
    toast('Failed to process query', true);
  } finally {
    setSending(false);
  }
});

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

async function downloadExport(id, format) {
  try {
    const res = await fetch('/api/export', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ message_id: id, format: format }),
    });
    if (!res.ok) {
      let msg = 'Failed to download data';
      try {
        const data = await res.json();
        if (data.error) msg = data.error;
      } catch (err) { /* not JSON */ }
      alert(msg);
      return;
    }
    const blob = await res.blob();
    const url = URL.createObjectURL(blob);
    const link = document.createElement('a');
    link.href = url;
    link.setAttribute('download', 'real_estate_data.' + format);
    document.body.appendChild(link);
    link.click();
    link.remove();
    URL.revokeObjectURL(url);
  } catch (err) {
    alert('Failed to download data');
  }
}

document.getElementById('chat').addEventListener('click', e => {
  const btn = e.target.closest('button.export');
  if (!btn) return;
  downloadExport(parseInt(btn.dataset.id, 10), btn.dataset.format);
});

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

async function loadState() {
  try {
    state = await api('GET', '/api/state');
    render();
  } catch (e) {
    toast('Failed to load session', true);
  }
}

async function loadLocalities() {
  // The endpoint re-asks the backend, so a list that was empty at
  // startup fills in once the backend comes up.
  try {
    const data = await api('GET', '/api/localities');
    if (!Array.isArray(data.localities)) return;
    if (state) {
      state.localities = data.localities;
      render();
    } else {
      const strip = document.getElementById('localities');
      strip.textContent = data.localities.length
        ? 'Available: ' + data.localities.join(', ')
        : '';
    }
  } catch (e) {
    // keep whatever the session snapshot showed
  }
}

loadState().then(loadLocalities);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wires_every_endpoint_it_needs() {
        for path in ["/api/state", "/api/chat", "/api/localities", "/api/export"] {
            assert!(INDEX_HTML.contains(path), "page never calls {path}");
        }
    }

    #[test]
    fn page_refreshes_the_locality_strip_after_load() {
        // The strip must not depend solely on the startup snapshot.
        assert!(INDEX_HTML.contains("loadState().then(loadLocalities)"));
    }
}
